//! Content-addressed image cache
//!
//! The image tag is the build context's fingerprint, so an unchanged
//! context never triggers a rebuild and any change always does.
//!
//! Two launchers racing on a cold cache may both build the same tag. The
//! result is identical either way, so no lock is taken.

use crate::error::LauncherResult;
use crate::fingerprint::Fingerprint;
use crate::orchestration::ContainerRuntime;
use console::style;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Image name paired with the fingerprint of its build inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    name: String,
    fingerprint: Fingerprint,
}

impl ImageTag {
    pub fn new(name: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            name: name.into(),
            fingerprint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Full `name:fingerprint` reference passed to the engine
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.fingerprint)
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.fingerprint)
    }
}

/// Outcome of `ensure_image`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    /// A matching image already existed
    Cached,
    /// The image was (re)built during this call
    Built,
}

/// Make sure an image for `tag` exists, building `context_dir` if needed.
///
/// `force` rebuilds even on a cache hit and bypasses the engine's layer
/// cache. Build output goes to stderr when `verbose`, otherwise to the
/// debug log; a failed build carries its output tail either way.
pub async fn ensure_image(
    runtime: &dyn ContainerRuntime,
    tag: &ImageTag,
    context_dir: &Path,
    force: bool,
    verbose: bool,
) -> LauncherResult<ImageStatus> {
    let reference = tag.reference();

    if !force && runtime.image_exists(&reference).await? {
        debug!("Image already cached: {}", reference);
        return Ok(ImageStatus::Cached);
    }

    if force {
        info!("Forcing rebuild of {}", reference);
    }
    eprintln!(
        "{} Building {} image {}...",
        style("…").cyan(),
        tag.name(),
        style(tag.fingerprint().short()).dim()
    );

    let on_output = move |line: String| {
        if verbose {
            eprintln!("{}", line);
        } else {
            debug!("build: {}", line);
        }
    };
    runtime
        .build_image(context_dir, &reference, force, &on_output)
        .await?;

    info!("Built image {}", reference);
    Ok(ImageStatus::Built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LauncherError;
    use crate::fingerprint::fingerprint;
    use crate::orchestration::fake::FakeRuntime;
    use tempfile::TempDir;

    fn tag() -> (TempDir, ImageTag) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM debian:12\n").unwrap();
        let fp = fingerprint(dir.path()).unwrap();
        (dir, ImageTag::new("incontext", fp))
    }

    #[test]
    fn reference_format() {
        let (_dir, tag) = tag();
        let reference = tag.reference();
        assert!(reference.starts_with("incontext:"));
        assert_eq!(reference.len(), "incontext:".len() + 64);
        assert_eq!(tag.to_string(), reference);
    }

    #[tokio::test]
    async fn cache_hit_builds_nothing() {
        let (dir, tag) = tag();
        let runtime = FakeRuntime::new().with_image(&tag.reference());

        let status = ensure_image(&runtime, &tag, dir.path(), false, false)
            .await
            .unwrap();

        assert_eq!(status, ImageStatus::Cached);
        assert!(runtime.builds().is_empty());
    }

    #[tokio::test]
    async fn force_rebuilds_exactly_once_without_cache() {
        let (dir, tag) = tag();
        let runtime = FakeRuntime::new().with_image(&tag.reference());

        let status = ensure_image(&runtime, &tag, dir.path(), true, false)
            .await
            .unwrap();

        assert_eq!(status, ImageStatus::Built);
        let builds = runtime.builds();
        assert_eq!(builds.len(), 1);
        assert!(builds[0].no_cache);
        assert_eq!(builds[0].tag, tag.reference());
        assert_eq!(builds[0].context_dir, dir.path());
    }

    #[tokio::test]
    async fn cache_miss_builds_with_layer_cache() {
        let (dir, tag) = tag();
        let runtime = FakeRuntime::new();

        let status = ensure_image(&runtime, &tag, dir.path(), false, true)
            .await
            .unwrap();

        assert_eq!(status, ImageStatus::Built);
        let builds = runtime.builds();
        assert_eq!(builds.len(), 1);
        assert!(!builds[0].no_cache);

        // Second launch with the same context is a hit
        let status = ensure_image(&runtime, &tag, dir.path(), false, false)
            .await
            .unwrap();
        assert_eq!(status, ImageStatus::Cached);
        assert_eq!(runtime.builds().len(), 1);
    }

    #[tokio::test]
    async fn build_failure_propagates() {
        let (dir, tag) = tag();
        let runtime = FakeRuntime {
            fail_builds: true,
            ..FakeRuntime::default()
        };

        let err = ensure_image(&runtime, &tag, dir.path(), false, false)
            .await
            .unwrap_err();

        assert!(matches!(err, LauncherError::BuildFailure { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
