//! Container runtime backed by the engine's command-line client
//!
//! Implements the ContainerRuntime trait by shelling out to `docker` or
//! `podman`. Both accept the same arguments for everything the launcher
//! does except the introspection query.

use crate::error::{LauncherError, LauncherResult};
use crate::orchestration::container::ContainerConfig;
use crate::orchestration::factory::Engine;
use crate::orchestration::runtime::ContainerRuntime;
use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Container runtime driving an engine CLI
pub struct CliRuntime {
    binary: String,
    engine: Engine,
}

impl CliRuntime {
    /// Create a runtime for the given engine binary
    pub fn new(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        let engine = Engine::from_binary(&binary);
        Self { binary, engine }
    }

    /// The engine binary invoked for every operation
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Execute an engine command and return the output
    async fn exec(&self, args: &[&str]) -> LauncherResult<std::process::Output> {
        debug!("Executing: {} {:?}", self.binary, args);

        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LauncherError::command_failed(format!("{} {:?}", self.binary, args), e))
    }

    /// Execute an engine command attached to the host terminal
    async fn exec_interactive(&self, args: &[String]) -> LauncherResult<i32> {
        debug!("Executing interactively: {} {:?}", self.binary, args);

        let status = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| LauncherError::command_failed(format!("{} {:?}", self.binary, args), e))?;

        Ok(exit_code(status))
    }
}

/// Exit status as a shell would report it.
///
/// Death by signal becomes `128 + signo`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn ping(&self) -> LauncherResult<()> {
        let output = self.exec(&["info"]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(LauncherError::command_exec(
                format!("{} info", self.binary),
                stderr.trim(),
            ))
        }
    }

    async fn image_exists(&self, tag: &str) -> LauncherResult<bool> {
        let output = self.exec(&["images", "-q", tag]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LauncherError::command_exec(
                format!("{} images", self.binary),
                stderr.trim(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().any(|line| !line.trim().is_empty()))
    }

    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        no_cache: bool,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> LauncherResult<()> {
        let context_str = context_dir.display().to_string();
        let mut args = vec!["build"];
        if no_cache {
            args.push("--no-cache");
        }
        args.extend(["-t", tag, context_str.as_str()]);

        debug!("Building image: {} {:?}", self.binary, args);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LauncherError::command_failed(format!("{} build", self.binary), e))?;

        let all_output = super::stream_child_output(&mut child, on_output).await;

        let status = child
            .wait()
            .await
            .map_err(|e| LauncherError::command_failed(format!("{} build", self.binary), e))?;

        if !status.success() {
            let combined = all_output.join("\n");
            let tail = super::build_error_output(&combined, "");
            return Err(LauncherError::BuildFailure {
                tag: tag.to_string(),
                reason: tail,
            });
        }

        Ok(())
    }

    async fn info(&self) -> LauncherResult<String> {
        let output = self.exec(&self.engine.info_args()).await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(LauncherError::command_exec(
                format!("{} info", self.binary),
                stderr.trim(),
            ))
        }
    }

    async fn run(&self, config: &ContainerConfig, command: &[String]) -> LauncherResult<i32> {
        let mut args = config.run_args();
        args.extend(command.iter().cloned());

        debug!("Running container: {} {:?}", self.binary, args);
        self.exec_interactive(&args).await
    }

    fn runtime_name(&self) -> &'static str {
        self.engine.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_runtime_new() {
        let runtime = CliRuntime::new("docker");
        assert_eq!(runtime.runtime_name(), "Docker");
        assert_eq!(runtime.binary(), "docker");
    }

    #[test]
    fn cli_runtime_podman_by_path() {
        let runtime = CliRuntime::new("/usr/bin/podman");
        assert_eq!(runtime.runtime_name(), "Podman");
    }

    #[tokio::test]
    async fn missing_binary_is_command_failed() {
        let runtime = CliRuntime::new("incontext-no-such-engine");
        let err = runtime.ping().await.unwrap_err();
        assert!(matches!(err, LauncherError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_passes_through() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // Raw wait status 2 is "killed by SIGINT"
        assert_eq!(exit_code(ExitStatus::from_raw(2)), 130);
    }
}
