//! Preflight plugins
//!
//! A preflight plugin claims one subcommand of the wrapped tool and may
//! adjust how its container is launched (published ports, interactive
//! shell) before anything starts. Plugins run synchronously, in the
//! launcher's own task, and must not block.

mod declared;
mod serve;
mod shell;

pub use declared::DeclaredPlugin;
pub use serve::{ServePlugin, DEFAULT_PORT};
pub use shell::ShellPlugin;

use crate::config::schema::PreflightConfig;
use crate::error::{LauncherError, LauncherResult};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Launch parameters accumulated by preflight plugins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfiguration {
    ports: BTreeSet<u16>,
    shell: bool,
}

impl LaunchConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `port` on the host at the same number
    pub fn add_port(&mut self, port: u16) {
        self.ports.insert(port);
    }

    /// Start an interactive shell instead of the wrapped tool
    pub fn request_shell(&mut self) {
        self.shell = true;
    }

    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn has_port(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn wants_shell(&self) -> bool {
        self.shell
    }

    /// `-p` arguments for every published port
    pub fn publish_args(&self) -> Vec<String> {
        self.ports.iter().map(|p| format!("{}:{}", p, p)).collect()
    }
}

/// A subcommand-scoped launch hook
pub trait PreflightPlugin: Send + Sync {
    /// Subcommand this plugin handles
    fn command(&self) -> &str;

    /// Adjust `config` given the arguments following the subcommand
    fn preflight(&self, config: &mut LaunchConfiguration, args: &[String]) -> LauncherResult<()>;
}

/// Subcommand name to plugin table
#[derive(Default)]
pub struct PreflightRegistry {
    plugins: HashMap<String, Box<dyn PreflightPlugin>>,
}

impl PreflightRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in plugins and any declared in configuration
    pub fn with_plugins(declared: &[PreflightConfig]) -> LauncherResult<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(ServePlugin))?;
        registry.register(Box::new(ShellPlugin))?;
        for entry in declared {
            registry.register(Box::new(DeclaredPlugin::from_config(entry)?))?;
        }
        Ok(registry)
    }

    /// Register a plugin. Each subcommand may be claimed once.
    pub fn register(&mut self, plugin: Box<dyn PreflightPlugin>) -> LauncherResult<()> {
        let command = plugin.command().to_string();
        if self.plugins.contains_key(&command) {
            return Err(LauncherError::PluginConflict(command));
        }
        debug!("Registered preflight plugin for '{}'", command);
        self.plugins.insert(command, plugin);
        Ok(())
    }

    /// Whether a plugin claims `command`
    pub fn handles(&self, command: &str) -> bool {
        self.plugins.contains_key(command)
    }

    /// Run the plugin claiming `command`, if any.
    ///
    /// Returns whether a plugin ran. Plugin errors abort the launch.
    pub fn dispatch(
        &self,
        command: &str,
        args: &[String],
        config: &mut LaunchConfiguration,
    ) -> LauncherResult<bool> {
        match self.plugins.get(command) {
            Some(plugin) => {
                debug!("Running preflight for '{}'", command);
                plugin.preflight(config, args)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
