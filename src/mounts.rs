//! Volume planning
//!
//! Host paths are mounted at the same location inside the container so
//! paths printed by the wrapped tool mean the same thing on the host. The
//! planner reduces the candidate paths to the smallest set of mounts that
//! still covers all of them.

use crate::error::{LauncherError, LauncherResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A bind mount from a host path to the identical container path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host: PathBuf,
    pub container: PathBuf,
}

impl Mount {
    fn mirrored(path: PathBuf) -> Self {
        Self {
            container: path.clone(),
            host: path,
        }
    }

    /// `host:container` form for the engine's `-v` flag
    pub fn volume_arg(&self) -> String {
        format!("{}:{}", self.host.display(), self.container.display())
    }
}

/// Minimal, ordered set of mounts. No entry lies inside another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountSet {
    mounts: Vec<Mount>,
}

impl MountSet {
    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        self.mounts.iter()
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Whether `path` is visible inside the container
    pub fn covers(&self, path: &Path) -> bool {
        self.mounts.iter().any(|m| path.starts_with(&m.host))
    }

    /// Host paths, in mount order
    pub fn host_paths(&self) -> Vec<&Path> {
        self.mounts.iter().map(|m| m.host.as_path()).collect()
    }

    /// `-v` arguments for every mount
    pub fn volume_args(&self) -> Vec<String> {
        self.mounts.iter().map(Mount::volume_arg).collect()
    }
}

/// Reduce absolute paths to the minimal covering mount set.
///
/// Paths are ordered component-wise, which places every directory directly
/// before its descendants, then any path inside the last accepted one is
/// dropped. Containment is tested per path component: `/a/bb` is not
/// inside `/a/b`.
pub fn plan<I, P>(paths: I) -> MountSet
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let sorted: BTreeSet<PathBuf> = paths.into_iter().map(Into::into).collect();

    let mut mounts: Vec<Mount> = Vec::new();
    for path in sorted {
        if let Some(last) = mounts.last() {
            if path.starts_with(&last.host) {
                debug!(
                    "{} is covered by {}",
                    path.display(),
                    last.host.display()
                );
                continue;
            }
        }
        mounts.push(Mount::mirrored(path));
    }

    MountSet { mounts }
}

/// Everything the wrapped tool may need to see on the host
#[derive(Debug, Clone)]
pub struct MountRequest<'a> {
    /// Forwarded command-line arguments; those naming existing paths are mounted
    pub args: &'a [String],
    /// Host working directory
    pub cwd: &'a Path,
    /// Launcher install directory
    pub install_dir: &'a Path,
    /// Paths that must be mounted and must exist
    pub required: &'a [PathBuf],
}

/// Collect and canonicalize candidate paths, then plan mounts.
///
/// Arguments that do not name an existing file or directory (option flags,
/// plain values) are skipped. Relative arguments resolve against `cwd`.
pub fn plan_for(request: &MountRequest<'_>) -> LauncherResult<MountSet> {
    let mut paths = Vec::new();

    paths.push(canonical(request.cwd)?);
    paths.push(canonical(request.install_dir)?);

    for path in request.required {
        let resolved = request.cwd.join(path);
        if !resolved.exists() {
            return Err(LauncherError::PathNotFound(path.clone()));
        }
        paths.push(canonical(&resolved)?);
    }

    for arg in request.args {
        if arg.is_empty() {
            continue;
        }
        let candidate = request.cwd.join(arg);
        if candidate.exists() {
            let path = canonical(&candidate)?;
            debug!("Argument {:?} names host path {}", arg, path.display());
            paths.push(path);
        }
    }

    let mounts = plan(paths);
    if let Some(bad) = mounts.iter().find(|m| !is_mountable(&m.host)) {
        return Err(LauncherError::UnmountablePath(bad.host.clone()));
    }
    Ok(mounts)
}

/// `-v host:container` splits on `:`, so a mounted path may not contain one.
/// Only the reduced set matters: a colon path inside another mount is fine.
fn is_mountable(path: &Path) -> bool {
    !path.as_os_str().to_string_lossy().contains(':')
}

fn canonical(path: &Path) -> LauncherResult<PathBuf> {
    path.canonicalize()
        .map_err(|e| LauncherError::io(format!("resolving path {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn hosts(set: &MountSet) -> Vec<String> {
        set.iter().map(|m| m.host.display().to_string()).collect()
    }

    #[test]
    fn nested_paths_are_absorbed() {
        let set = plan(["/a", "/a/b", "/c"]);
        assert_eq!(hosts(&set), vec!["/a", "/c"]);
    }

    #[test]
    fn string_prefix_siblings_stay_separate() {
        let set = plan(["/a/bb", "/a/b"]);
        assert_eq!(hosts(&set), vec!["/a/b", "/a/bb"]);
    }

    #[test]
    fn sibling_sorting_between_parent_and_child() {
        // "/a-b" sorts between "/a" and "/a/b" as a string but not by component
        let set = plan(["/a/b", "/a-b", "/a"]);
        assert_eq!(hosts(&set), vec!["/a", "/a-b"]);
    }

    #[test]
    fn duplicates_collapse() {
        let set = plan(["/home/me/site", "/home/me/site", "/home/me/site/content"]);
        assert_eq!(hosts(&set), vec!["/home/me/site"]);
    }

    #[test]
    fn root_covers_everything() {
        let set = plan(["/usr", "/", "/home/me"]);
        assert_eq!(hosts(&set), vec!["/"]);
    }

    #[test]
    fn mounts_are_mirrored() {
        let set = plan(["/srv/site"]);
        let mount = set.iter().next().unwrap();
        assert_eq!(mount.host, mount.container);
        assert_eq!(set.volume_args(), vec!["/srv/site:/srv/site"]);
    }

    #[test]
    fn no_entry_is_inside_another() {
        let set = plan(["/x/y/z", "/x/y", "/x/yz", "/w", "/x/y/q", "/w/v"]);
        let paths = set.host_paths();
        for (i, a) in paths.iter().enumerate() {
            for (j, b) in paths.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{:?} inside {:?}", b, a);
                }
            }
        }
        assert!(set.covers(Path::new("/x/y/z")));
        assert!(set.covers(Path::new("/x/yz")));
    }

    #[test]
    fn plan_for_mounts_existing_arguments_only() {
        let root = TempDir::new().unwrap();
        let root_path = root.path().canonicalize().unwrap();
        let cwd = root_path.join("work");
        let install = root_path.join("install");
        let elsewhere = root_path.join("elsewhere");
        fs::create_dir_all(cwd.join("site")).unwrap();
        fs::create_dir_all(&install).unwrap();
        fs::create_dir_all(&elsewhere).unwrap();

        let args: Vec<String> = vec![
            "build".to_string(),
            "./site".to_string(),
            "--port".to_string(),
            "8000".to_string(),
            elsewhere.display().to_string(),
        ];
        let set = plan_for(&MountRequest {
            args: &args,
            cwd: &cwd,
            install_dir: &install,
            required: &[],
        })
        .unwrap();

        let mut expected = vec![cwd.clone(), install.clone(), elsewhere.clone()];
        expected.sort();
        let got: Vec<PathBuf> = set.iter().map(|m| m.host.clone()).collect();
        assert_eq!(got, expected);
        assert!(set.covers(&cwd.join("site")));
    }

    #[test]
    fn plan_for_rejects_missing_required_volume() {
        let root = TempDir::new().unwrap();
        let required = vec![PathBuf::from("does-not-exist")];
        let err = plan_for(&MountRequest {
            args: &[],
            cwd: root.path(),
            install_dir: root.path(),
            required: &required,
        })
        .unwrap_err();
        assert!(matches!(err, LauncherError::PathNotFound(_)));
    }

    #[test]
    fn plan_for_rejects_colon_in_mounted_path() {
        let root = TempDir::new().unwrap();
        let cwd = root.path().canonicalize().unwrap().join("work");
        let odd = root.path().canonicalize().unwrap().join("media:2024");
        fs::create_dir_all(&cwd).unwrap();
        fs::create_dir_all(&odd).unwrap();

        let required = vec![odd.clone()];
        let err = plan_for(&MountRequest {
            args: &[],
            cwd: &cwd,
            install_dir: &cwd,
            required: &required,
        })
        .unwrap_err();
        assert!(matches!(err, LauncherError::UnmountablePath(ref p) if *p == odd));
    }

    #[test]
    fn colon_path_inside_a_mount_is_allowed() {
        let root = TempDir::new().unwrap();
        let cwd = root.path().canonicalize().unwrap();
        fs::create_dir_all(cwd.join("posts:draft")).unwrap();

        let args = vec!["build".to_string(), "posts:draft".to_string()];
        let set = plan_for(&MountRequest {
            args: &args,
            cwd: &cwd,
            install_dir: &cwd,
            required: &[],
        })
        .unwrap();
        assert_eq!(set.host_paths(), vec![cwd.as_path()]);
    }
}
