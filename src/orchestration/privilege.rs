//! User-mapping detection
//!
//! A rootless engine already runs containers as the invoking user. Any other
//! engine needs an explicit `--user uid:gid` so files written into mounted
//! host directories are owned by the caller.

use crate::orchestration::runtime::ContainerRuntime;
use serde_json::Value;
use tracing::debug;

/// How the invoking user is mapped into the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMapping {
    /// The engine maps the user transparently
    Transparent,
    /// Pass these ids explicitly
    Explicit { uid: u32, gid: u32 },
}

impl UserMapping {
    /// Mapping for the current process's real user and group
    pub fn current_user() -> Self {
        // SAFETY: getuid/getgid cannot fail and touch no memory
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        UserMapping::Explicit { uid, gid }
    }

    /// Value for the engine's `--user` flag, if one is needed
    pub fn user_flag(&self) -> Option<String> {
        match self {
            UserMapping::Transparent => None,
            UserMapping::Explicit { uid, gid } => Some(format!("{}:{}", uid, gid)),
        }
    }
}

/// Decide the user mapping from the runtime's introspection output.
///
/// Query or parse failures fall back to explicit mapping.
pub async fn resolve_user_mapping(runtime: &dyn ContainerRuntime) -> UserMapping {
    let rootless = match runtime.info().await {
        Ok(raw) => parse_rootless(&raw).unwrap_or_else(|| {
            debug!("Unrecognised {} info output: {}", runtime.runtime_name(), raw);
            false
        }),
        Err(e) => {
            debug!("{} info failed: {}", runtime.runtime_name(), e);
            false
        }
    };

    if rootless {
        debug!("{} is rootless; no user mapping", runtime.runtime_name());
        UserMapping::Transparent
    } else {
        UserMapping::current_user()
    }
}

/// Parse rootless mode from engine introspection output.
///
/// Accepts Docker's `SecurityOptions` JSON array (rootless if any entry
/// carries `name=rootless`) or Podman's `info` JSON object
/// (`host.security.rootless`). Returns `None` for anything else.
pub fn parse_rootless(raw: &str) -> Option<bool> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Array(items) => {
            let mut rootless = false;
            for item in items {
                let option = item.as_str()?;
                if option
                    .split(',')
                    .any(|part| part.trim().eq_ignore_ascii_case("name=rootless"))
                {
                    rootless = true;
                }
            }
            Some(rootless)
        }
        value @ Value::Object(_) => value.pointer("/host/security/rootless")?.as_bool(),
        _ => None,
    }
}
