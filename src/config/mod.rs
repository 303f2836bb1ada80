//! Configuration management for the launcher

pub mod schema;

pub use schema::Config;

use crate::error::{LauncherError, LauncherResult};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("incontext")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub async fn load(&self) -> LauncherResult<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> LauncherResult<Config> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            LauncherError::io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| LauncherError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Directory holding the wrapped tool's support files.
    ///
    /// Falls back to the directory containing the running executable.
    pub fn install_dir(&self) -> LauncherResult<PathBuf> {
        if let Some(ref dir) = self.launcher.install_dir {
            return Ok(dir.clone());
        }
        let exe = std::env::current_exe()
            .map_err(|e| LauncherError::io("locating the launcher executable", e))?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| LauncherError::Internal(format!("{} has no parent", exe.display())))
    }

    /// Build context directory whose contents identify the image
    pub fn context_dir(&self, install_dir: &Path) -> PathBuf {
        self.image
            .context
            .clone()
            .unwrap_or_else(|| install_dir.join("docker"))
    }

    /// Command vector that starts the wrapped tool inside the container
    pub fn entrypoint(&self, install_dir: &Path) -> Vec<String> {
        match self.image.entrypoint {
            Some(ref entrypoint) if !entrypoint.is_empty() => entrypoint.clone(),
            _ => vec![
                "python3".to_string(),
                install_dir.join("incontext.py").display().to_string(),
            ],
        }
    }
}

/// Per-invocation settings derived from the command line.
///
/// Built once in `main` and handed to each stage by reference.
#[derive(Debug, Clone, Default)]
pub struct LaunchSettings {
    /// Verbosity level (`-v` count)
    pub verbose: u8,

    /// Rebuild the image even when a matching tag exists
    pub force_rebuild: bool,

    /// Additional host paths to mount
    pub extra_volumes: Vec<PathBuf>,

    /// Host working directory, mirrored inside the container
    pub cwd: PathBuf,

    /// Arguments forwarded to the wrapped tool, starting with its subcommand
    pub command: Vec<String>,
}

impl LaunchSettings {
    /// Whether build output should be shown in full
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }
}
