//! `shell` preflight: drop into the image instead of running the tool

use super::{LaunchConfiguration, PreflightPlugin};
use crate::error::LauncherResult;

/// Turns `incontext shell` into an interactive session in the toolchain image
pub struct ShellPlugin;

impl PreflightPlugin for ShellPlugin {
    fn command(&self) -> &str {
        "shell"
    }

    fn preflight(&self, config: &mut LaunchConfiguration, _args: &[String]) -> LauncherResult<()> {
        config.request_shell();
        Ok(())
    }
}
