//! Configuration schema for the launcher
//!
//! Configuration is stored at `~/.config/incontext/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container runtime settings
    pub runtime: RuntimeConfig,

    /// Image build and entry point settings
    pub image: ImageConfig,

    /// Host-side launcher settings
    pub launcher: LauncherConfig,

    /// Declarative preflight plugins
    pub preflight: Vec<PreflightConfig>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Container runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Container engine CLI: "docker" or "podman"
    pub binary: String,

    /// Delay between readiness probes while the daemon is starting
    pub readiness_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            readiness_interval_ms: 2000,
        }
    }
}

/// Image configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Repository name; the fingerprint becomes the tag
    pub name: String,

    /// Build context directory (defaults to `<install_dir>/docker`)
    pub context: Option<PathBuf>,

    /// Command that starts the wrapped tool inside the container
    /// (defaults to `python3 <install_dir>/incontext.py`)
    pub entrypoint: Option<Vec<String>>,

    /// Shell used for interactive sessions
    pub shell: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            name: "incontext".to_string(),
            context: None,
            entrypoint: None,
            shell: "/bin/bash".to_string(),
        }
    }
}

/// Launcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Directory holding the wrapped tool's support files
    /// (defaults to the directory of the running executable)
    pub install_dir: Option<PathBuf>,

    /// Host paths mounted on every launch
    pub volumes: Vec<PathBuf>,
}

/// A preflight plugin declared in configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Subcommand this entry applies to
    pub command: String,

    /// Ports to publish
    pub ports: Vec<u16>,

    /// Launch an interactive shell instead of the wrapped tool
    pub shell: bool,
}
