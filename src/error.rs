//! Error types for the InContext launcher
//!
//! All modules use `LauncherResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for launcher operations
pub type LauncherResult<T> = Result<T, LauncherError>;

/// All errors that can abort a launch
#[derive(Error, Debug)]
pub enum LauncherError {
    // Image errors
    #[error("Image build failed for {tag}:\n{reason}")]
    BuildFailure { tag: String, reason: String },

    #[error("Failed to fingerprint build context at {path}: {source}")]
    FingerprintIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Preflight errors
    #[error("Preflight for '{command}' failed: {reason}")]
    Plugin { command: String, reason: String },

    #[error("A preflight plugin is already registered for '{0}'")]
    PluginConflict(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Cannot bind-mount {0}: path contains ':'")]
    UnmountablePath(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LauncherError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a preflight plugin error
    pub fn plugin(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Plugin {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code used when the launch aborts before a container runs.
    ///
    /// A container's own exit status never goes through here. `2` is left to
    /// clap for launcher usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::BuildFailure { .. } => 3,
            Self::FingerprintIo { .. } => 4,
            Self::Plugin { .. } | Self::PluginConflict(_) => 5,
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::BuildFailure { .. } => {
                Some("Re-run with -v to see the full build output, or --force-rebuild to skip the layer cache")
            }
            Self::FingerprintIo { .. } => Some("Check that [image] context points at a readable directory"),
            Self::CommandFailed { .. } => Some("Is the container runtime installed? See [runtime] binary"),
            Self::ConfigInvalid { .. } => Some("Fix or remove the file; all keys are optional"),
            Self::UnmountablePath(_) => {
                Some("Rename the directory, or run from a parent directory without ':' in its path")
            }
            _ => None,
        }
    }
}
