//! Runtime factory for the configured container engine

use crate::config::Config;
use crate::orchestration::cli_runtime::CliRuntime;
use crate::orchestration::runtime::ContainerRuntime;
use std::path::Path;

/// Container engine family, detected from the configured binary name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Docker (or a Docker-compatible CLI)
    Docker,
    /// Podman
    Podman,
}

impl Engine {
    /// Detect the engine family from a binary name or path
    pub fn from_binary(binary: &str) -> Self {
        let stem = Path::new(binary)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(binary);
        if stem.contains("podman") {
            Engine::Podman
        } else {
            Engine::Docker
        }
    }

    /// Get a human-readable engine name
    pub fn name(&self) -> &'static str {
        match self {
            Engine::Docker => "Docker",
            Engine::Podman => "Podman",
        }
    }

    /// Arguments for the introspection query that reveals rootless mode
    pub fn info_args(&self) -> [&'static str; 3] {
        match self {
            Engine::Docker => ["info", "--format", "{{json .SecurityOptions}}"],
            Engine::Podman => ["info", "--format", "json"],
        }
    }
}

/// Create the container runtime named by the configuration
pub fn create_runtime(config: &Config) -> Box<dyn ContainerRuntime> {
    Box::new(CliRuntime::new(config.runtime.binary.clone()))
}
