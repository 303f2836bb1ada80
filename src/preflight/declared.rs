//! Preflight plugins declared in `[[preflight]]` configuration tables

use super::{LaunchConfiguration, PreflightPlugin};
use crate::config::schema::PreflightConfig;
use crate::error::{LauncherError, LauncherResult};

/// Fixed ports and/or shell request for one subcommand
#[derive(Debug, Clone)]
pub struct DeclaredPlugin {
    command: String,
    ports: Vec<u16>,
    shell: bool,
}

impl DeclaredPlugin {
    /// Validate a configuration entry
    pub fn from_config(entry: &PreflightConfig) -> LauncherResult<Self> {
        let command = entry.command.trim();
        if command.is_empty() || command.starts_with('-') {
            return Err(LauncherError::plugin(
                entry.command.clone(),
                "[[preflight]] entries need a subcommand name",
            ));
        }
        if entry.ports.contains(&0) {
            return Err(LauncherError::plugin(command, "port 0 cannot be published"));
        }

        Ok(Self {
            command: command.to_string(),
            ports: entry.ports.clone(),
            shell: entry.shell,
        })
    }
}

impl PreflightPlugin for DeclaredPlugin {
    fn command(&self) -> &str {
        &self.command
    }

    fn preflight(&self, config: &mut LaunchConfiguration, _args: &[String]) -> LauncherResult<()> {
        for port in &self.ports {
            config.add_port(*port);
        }
        if self.shell {
            config.request_shell();
        }
        Ok(())
    }
}
