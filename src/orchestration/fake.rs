//! In-memory container runtime for unit tests

use crate::error::{LauncherError, LauncherResult};
use crate::orchestration::container::ContainerConfig;
use crate::orchestration::runtime::ContainerRuntime;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A recorded `build_image` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCall {
    pub context_dir: PathBuf,
    pub tag: String,
    pub no_cache: bool,
}

#[derive(Default)]
pub(crate) struct State {
    ping_calls: u32,
    images: HashSet<String>,
    builds: Vec<BuildCall>,
    runs: Vec<(ContainerConfig, Vec<String>)>,
}

/// Scriptable runtime that records every call
pub struct FakeRuntime {
    /// Number of initial ping attempts that fail
    pub ping_failures: u32,
    /// Raw introspection output, or `None` to make `info` fail
    pub info_output: Option<String>,
    /// Make every build exit non-zero
    pub fail_builds: bool,
    /// Lines emitted by each build
    pub build_output: Vec<String>,
    /// Exit status returned by `run`
    pub exit_code: i32,
    pub(crate) state: Mutex<State>,
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self {
            ping_failures: 0,
            info_output: Some("[]".to_string()),
            fail_builds: false,
            build_output: vec!["Step 1/1 : FROM debian".to_string()],
            exit_code: 0,
            state: Mutex::new(State::default()),
        }
    }
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `tag` is already present locally
    pub fn with_image(self, tag: &str) -> Self {
        self.state.lock().unwrap().images.insert(tag.to_string());
        self
    }

    pub fn ping_calls(&self) -> u32 {
        self.state.lock().unwrap().ping_calls
    }

    pub fn builds(&self) -> Vec<BuildCall> {
        self.state.lock().unwrap().builds.clone()
    }

    pub fn runs(&self) -> Vec<(ContainerConfig, Vec<String>)> {
        self.state.lock().unwrap().runs.clone()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ping(&self) -> LauncherResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ping_calls += 1;
        if state.ping_calls <= self.ping_failures {
            Err(LauncherError::command_exec("fake info", "daemon not running"))
        } else {
            Ok(())
        }
    }

    async fn image_exists(&self, tag: &str) -> LauncherResult<bool> {
        Ok(self.state.lock().unwrap().images.contains(tag))
    }

    async fn build_image(
        &self,
        context_dir: &Path,
        tag: &str,
        no_cache: bool,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> LauncherResult<()> {
        self.state.lock().unwrap().builds.push(BuildCall {
            context_dir: context_dir.to_path_buf(),
            tag: tag.to_string(),
            no_cache,
        });
        for line in &self.build_output {
            on_output(line.clone());
        }
        if self.fail_builds {
            return Err(LauncherError::BuildFailure {
                tag: tag.to_string(),
                reason: self.build_output.join("\n"),
            });
        }
        self.state.lock().unwrap().images.insert(tag.to_string());
        Ok(())
    }

    async fn info(&self) -> LauncherResult<String> {
        self.info_output
            .clone()
            .ok_or_else(|| LauncherError::command_exec("fake info", "permission denied"))
    }

    async fn run(&self, config: &ContainerConfig, command: &[String]) -> LauncherResult<i32> {
        self.state
            .lock()
            .unwrap()
            .runs
            .push((config.clone(), command.to_vec()));
        Ok(self.exit_code)
    }

    fn runtime_name(&self) -> &'static str {
        "Fake"
    }
}
