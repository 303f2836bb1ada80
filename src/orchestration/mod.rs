//! Orchestration module for the container engine
//!
//! Wraps the host's container CLI (Docker or Podman) behind the
//! `ContainerRuntime` trait, plus the stages that only talk to the engine:
//! daemon readiness and user-mapping detection.

mod cli_runtime;
mod container;
mod factory;
mod privilege;
mod readiness;
mod runtime;

#[cfg(test)]
pub(crate) mod fake;

pub use cli_runtime::CliRuntime;
pub use container::ContainerConfig;
pub use factory::{create_runtime, Engine};
pub use privilege::{parse_rootless, resolve_user_mapping, UserMapping};
pub use readiness::ReadinessGate;
pub use runtime::ContainerRuntime;

use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns all collected output lines for error reporting. Streams that were
/// not piped are treated as already closed.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(String) + Send + Sync),
) -> Vec<String> {
    let mut stderr_reader = child.stderr.take().map(|s| BufReader::new(s).lines());
    let mut stdout_reader = child.stdout.take().map(|s| BufReader::new(s).lines());

    let mut all_output = Vec::new();
    let mut stderr_done = stderr_reader.is_none();
    let mut stdout_done = stdout_reader.is_none();

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = next_line(&mut stderr_reader), if !stderr_done => {
                match line {
                    Some(line) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    None => stderr_done = true,
                }
            }
            line = next_line(&mut stdout_reader), if !stdout_done => {
                match line {
                    Some(line) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    None => stdout_done = true,
                }
            }
        }
    }

    all_output
}

async fn next_line<R>(reader: &mut Option<tokio::io::Lines<BufReader<R>>>) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match reader {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => None,
    }
}
