//! Launch orchestration
//!
//! Stages run strictly in order: readiness, preflight, image, mounts, user
//! mapping, run. Every stage that can fail does so before the container
//! starts, so an aborted launch leaves nothing behind.

use crate::cli::split_subcommand;
use crate::config::{Config, LaunchSettings};
use crate::error::{LauncherError, LauncherResult};
use crate::fingerprint::fingerprint;
use crate::image::{ensure_image, ImageStatus, ImageTag};
use crate::mounts::{plan_for, MountRequest, MountSet};
use crate::orchestration::{resolve_user_mapping, ContainerConfig, ContainerRuntime, ReadinessGate};
use crate::preflight::{LaunchConfiguration, PreflightRegistry};
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{debug, info};

/// Everything decided before the container starts
#[derive(Debug, Clone)]
pub struct PreparedLaunch {
    pub image: ImageTag,
    pub image_status: ImageStatus,
    pub mounts: MountSet,
    pub container: ContainerConfig,
    pub command: Vec<String>,
}

/// Runs the wrapped tool in its container
pub struct Launcher<'a> {
    runtime: &'a dyn ContainerRuntime,
    config: &'a Config,
    registry: &'a PreflightRegistry,
    gate: ReadinessGate,
    terminal: bool,
    delegate_interrupts: bool,
}

impl<'a> Launcher<'a> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        config: &'a Config,
        registry: &'a PreflightRegistry,
    ) -> Self {
        Self {
            runtime,
            config,
            registry,
            gate: ReadinessGate::new(Duration::from_millis(config.runtime.readiness_interval_ms)),
            terminal: std::io::stdin().is_terminal(),
            delegate_interrupts: true,
        }
    }

    /// Override terminal detection
    pub fn with_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    /// Keep the default SIGINT disposition in the host process
    pub fn without_interrupt_delegation(mut self) -> Self {
        self.delegate_interrupts = false;
        self
    }

    /// Run the launch and return the container's exit status
    pub async fn launch(&self, settings: &LaunchSettings) -> LauncherResult<i32> {
        let prepared = self.prepare(settings).await?;

        if self.delegate_interrupts {
            delegate_interrupts()?;
        }

        info!("Starting container from {}", prepared.image.reference());
        let code = self
            .runtime
            .run(&prepared.container, &prepared.command)
            .await?;
        debug!("Container exited with {}", code);
        Ok(code)
    }

    /// Run every stage up to, but not including, starting the container
    pub async fn prepare(&self, settings: &LaunchSettings) -> LauncherResult<PreparedLaunch> {
        self.gate.await_ready(self.runtime).await;

        let mut launch = LaunchConfiguration::new();
        if let Some((subcommand, rest)) = split_subcommand(&settings.command) {
            self.registry.dispatch(subcommand, rest, &mut launch)?;
        }

        let install_dir = self.config.install_dir()?;
        let context_dir = self.config.context_dir(&install_dir);
        let image = ImageTag::new(self.config.image.name.clone(), fingerprint(&context_dir)?);
        let image_status = ensure_image(
            self.runtime,
            &image,
            &context_dir,
            settings.force_rebuild,
            settings.is_verbose(),
        )
        .await?;

        let cwd = settings
            .cwd
            .canonicalize()
            .map_err(|e| LauncherError::io("resolving working directory", e))?;
        let mut required = self.config.launcher.volumes.clone();
        required.extend(settings.extra_volumes.iter().cloned());
        let mounts = plan_for(&MountRequest {
            args: &settings.command,
            cwd: &cwd,
            install_dir: &install_dir,
            required: &required,
        })?;
        debug!("Mounts: {:?}", mounts.host_paths());

        let user = resolve_user_mapping(self.runtime).await.user_flag();

        let command = if launch.wants_shell() {
            vec![self.config.image.shell.clone()]
        } else {
            let mut command = self.config.entrypoint(&install_dir);
            command.extend(settings.command.iter().cloned());
            command
        };

        let container = ContainerConfig {
            image: image.reference(),
            workdir: cwd.display().to_string(),
            volumes: mounts.volume_args(),
            ports: launch.publish_args(),
            user,
            interactive: self.terminal || launch.wants_shell(),
            tty: self.terminal,
        };

        Ok(PreparedLaunch {
            image,
            image_status,
            mounts,
            container,
            command,
        })
    }
}

/// Leave interrupt handling to the container.
///
/// The host keeps running on Ctrl-C and exits only once the container
/// does. A handled signal, unlike an ignored one, is reset to its default
/// in the engine client on exec.
fn delegate_interrupts() -> LauncherResult<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupts = signal(SignalKind::interrupt())
            .map_err(|e| LauncherError::io("installing interrupt handler", e))?;
        tokio::spawn(async move {
            while interrupts.recv().await.is_some() {
                debug!("Interrupt left to the container");
            }
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupt left to the container");
            }
        });
    }

    Ok(())
}
