//! Daemon readiness gate
//!
//! The launcher may be started at login, before the container daemon has
//! finished booting. Readiness is awaited without a deadline.

use crate::orchestration::runtime::ContainerRuntime;
use console::style;
use std::time::Duration;
use tracing::{debug, info};

/// Default delay between status probes
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Blocks until the container runtime answers a status query
#[derive(Debug, Clone, Copy)]
pub struct ReadinessGate {
    interval: Duration,
}

impl ReadinessGate {
    /// Create a gate that probes every `interval`
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Wait until the runtime is up, printing a single notice if it is not.
    ///
    /// Returns the number of status queries issued.
    pub async fn await_ready(&self, runtime: &dyn ContainerRuntime) -> u32 {
        let name = runtime.runtime_name();
        self.await_ready_with(runtime, || {
            eprintln!(
                "{} Waiting for {} to start...",
                style("…").cyan(),
                style(name).bold()
            );
        })
        .await
    }

    /// Wait until the runtime is up, calling `on_waiting` once on the first failure.
    ///
    /// Returns the number of status queries issued.
    pub async fn await_ready_with(
        &self,
        runtime: &dyn ContainerRuntime,
        mut on_waiting: impl FnMut(),
    ) -> u32 {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match runtime.ping().await {
                Ok(()) => {
                    if attempts > 1 {
                        info!("{} ready after {} attempts", runtime.runtime_name(), attempts);
                    }
                    return attempts;
                }
                Err(e) => {
                    debug!("Readiness probe {} failed: {}", attempts, e);
                    if attempts == 1 {
                        on_waiting();
                    }
                }
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
