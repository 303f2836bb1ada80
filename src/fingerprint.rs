//! Content fingerprinting for image build contexts
//!
//! The fingerprint is a SHA256 digest over every regular file and symlink
//! under a directory: for each entry, in lexicographic order of its relative
//! name, the name's UTF-8 bytes followed by the file's bytes. A symlink
//! contributes its target path instead, the way the engine copies it into
//! the build context. Links are never followed. Traversal order on disk never
//! affects the result.

use crate::error::{LauncherError, LauncherResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Hex-encoded SHA256 digest of a directory tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// The full hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log output
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fingerprint a directory tree.
///
/// Fails with `FingerprintIo` if the directory or any file in it cannot be
/// read, including files that vanish between listing and hashing.
pub fn fingerprint(dir: &Path) -> LauncherResult<Fingerprint> {
    let files = collect_files(dir)?;

    let mut hasher = Sha256::new();
    for entry in &files {
        hasher.update(entry.name.as_bytes());

        match entry.kind {
            EntryKind::File => {
                let mut file = File::open(&entry.path).map_err(|e| io_error(&entry.path, e))?;
                io::copy(&mut file, &mut hasher).map_err(|e| io_error(&entry.path, e))?;
            }
            EntryKind::Symlink => {
                let target = fs::read_link(&entry.path).map_err(|e| io_error(&entry.path, e))?;
                hasher.update(SYMLINK_MARKER);
                hasher.update(target.to_string_lossy().as_bytes());
            }
        }
    }

    let digest = Fingerprint(hex::encode(hasher.finalize()));
    debug!(
        "Fingerprinted {} files in {}: {}",
        files.len(),
        dir.display(),
        digest.short()
    );
    Ok(digest)
}

/// Separates a link's name from its target so a link never hashes like a
/// regular file whose contents spell the target.
const SYMLINK_MARKER: &[u8] = b"\0symlink\0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Symlink,
}

#[derive(Debug)]
struct ContextEntry {
    name: String,
    path: PathBuf,
    kind: EntryKind,
}

/// Regular files and symlinks under `dir`, sorted by relative name.
fn collect_files(dir: &Path) -> LauncherResult<Vec<ContextEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"));
            io_error(&path, source)
        })?;

        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            continue;
        };

        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| LauncherError::Internal(e.to_string()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        files.push(ContextEntry {
            name,
            path: entry.into_path(),
            kind,
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn io_error(path: &Path, source: io::Error) -> LauncherError {
    LauncherError::FingerprintIo {
        path: path.to_path_buf(),
        source,
    }
}
