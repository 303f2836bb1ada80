//! `serve` preflight: publish the preview server's port

use super::{LaunchConfiguration, PreflightPlugin};
use crate::error::{LauncherError, LauncherResult};

/// Port the wrapped tool's preview server listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 8000;

/// Publishes the port given by `--port`/`-p` (default 8000)
pub struct ServePlugin;

impl PreflightPlugin for ServePlugin {
    fn command(&self) -> &str {
        "serve"
    }

    fn preflight(&self, config: &mut LaunchConfiguration, args: &[String]) -> LauncherResult<()> {
        config.add_port(port_option(args)?.unwrap_or(DEFAULT_PORT));
        Ok(())
    }
}

/// Find the last `--port N`, `--port=N`, `-p N` or `-pN` in `args`.
fn port_option(args: &[String]) -> LauncherResult<Option<u16>> {
    let mut port = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let value = if arg == "--port" || arg == "-p" {
            match iter.next() {
                Some(value) => value.as_str(),
                None => return Err(LauncherError::plugin("serve", format!("{} needs a value", arg))),
            }
        } else if let Some(value) = arg.strip_prefix("--port=") {
            value
        } else if let Some(value) = arg.strip_prefix("-p").filter(|v| !v.is_empty()) {
            value
        } else {
            continue;
        };
        port = Some(parse_port(value)?);
    }

    Ok(port)
}

fn parse_port(value: &str) -> LauncherResult<u16> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(LauncherError::plugin(
            "serve",
            format!("invalid port '{}'", value),
        )),
    }
}
