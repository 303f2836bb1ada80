//! InContext - containerized site generator launcher
//!
//! CLI entry point: builds the per-invocation settings, runs the launch,
//! and exits with the container's status.

use clap::Parser;
use console::style;
use incontext::cli::Cli;
use incontext::config::{ConfigManager, LaunchSettings};
use incontext::error::{LauncherError, LauncherResult};
use incontext::orchestration::create_runtime;
use incontext::preflight::PreflightRegistry;
use incontext::Launcher;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(status_byte(code)),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> LauncherResult<i32> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config.general.log_format);
    if config_manager.path().exists() {
        debug!("Loaded configuration from {}", config_manager.path().display());
    } else {
        debug!(
            "No config file at {}, using defaults",
            config_manager.path().display()
        );
    }

    let cwd = std::env::current_dir()
        .map_err(|e| LauncherError::io("getting current directory", e))?;
    let settings = LaunchSettings {
        verbose: cli.verbose,
        force_rebuild: cli.force_rebuild,
        extra_volumes: cli.volume,
        cwd,
        command: cli.command,
    };

    let registry = PreflightRegistry::with_plugins(&config.preflight)?;
    let runtime = create_runtime(&config);
    debug!("Using runtime: {}", runtime.runtime_name());

    Launcher::new(runtime.as_ref(), &config, &registry)
        .launch(&settings)
        .await
}

/// Logging: 0 = warn, 1 = info, 2+ = debug. `RUST_LOG` wins when set.
fn init_logging(verbose: u8, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("incontext=warn"),
        1 => EnvFilter::new("incontext=info"),
        _ => EnvFilter::new("incontext=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Exit statuses are reported modulo 256, as a shell would.
fn status_byte(code: i32) -> u8 {
    (code & 0xff) as u8
}
