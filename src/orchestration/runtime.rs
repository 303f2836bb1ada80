//! Container runtime abstraction
//!
//! The launcher only needs five things from a container engine: a health
//! probe, an image lookup, a build, an introspection dump, and a blocking
//! run. Anything that provides them can host the wrapped tool.

use crate::error::LauncherResult;
use crate::orchestration::container::ContainerConfig;
use async_trait::async_trait;
use std::path::Path;

/// Abstract container runtime interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lightweight status query; `Err` while the daemon is unreachable
    async fn ping(&self) -> LauncherResult<()>;

    /// Check whether any local image carries `tag`
    async fn image_exists(&self, tag: &str) -> LauncherResult<bool>;

    /// Build `context_dir` into `tag`, passing each output line to `on_output`.
    ///
    /// `no_cache` disables the engine's layer cache.
    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        no_cache: bool,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> LauncherResult<()>;

    /// Raw introspection output used to detect rootless operation
    async fn info(&self) -> LauncherResult<String>;

    /// Run a container in the foreground and return its exit status
    async fn run(&self, config: &ContainerConfig, command: &[String]) -> LauncherResult<i32>;

    /// Get the human-readable runtime name for display
    fn runtime_name(&self) -> &'static str;
}
