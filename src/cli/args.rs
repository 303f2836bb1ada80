//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Options of the wrapped tool that consume the following token.
///
/// Needed to find the subcommand in `incontext --site ./blog build`.
const TOOL_VALUE_OPTIONS: &[&str] = &["--site", "-s"];

/// InContext - run the site generator in its toolchain container
///
/// Builds (or reuses) the container image for the current toolchain and runs
/// the given InContext command inside it with the relevant host paths mounted.
#[derive(Parser, Debug)]
#[command(name = "incontext")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info and full build output, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Rebuild the toolchain image, bypassing all caches
    #[arg(long)]
    pub force_rebuild: bool,

    /// Configuration file path
    #[arg(short, long, env = "INCONTEXT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional host path to mount in the container (repeatable)
    #[arg(long, value_name = "PATH")]
    pub volume: Vec<PathBuf>,

    /// InContext subcommand and its arguments, forwarded verbatim
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Split forwarded arguments into the subcommand and what follows it.
///
/// The subcommand is the first token that is neither an option nor the
/// value of one of the wrapped tool's value-taking global options.
pub fn split_subcommand(args: &[String]) -> Option<(&str, &[String])> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if TOOL_VALUE_OPTIONS.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        return Some((arg, &args[i + 1..]));
    }
    None
}
