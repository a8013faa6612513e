//! Staging directory lifecycle.
//!
//! Whether copy or package may run is derived from the filesystem on every
//! call; nothing is cached between operations.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::STAGING_DIR_NAME;

/// The operation currently permitted for a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Copy,
    Package,
}

impl std::fmt::Display for NextAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NextAction::Copy => write!(f, "ready to copy"),
            NextAction::Package => write!(f, "ready to package"),
        }
    }
}

/// `<destination>/staging`
pub fn staging_dir(destination: &Path) -> PathBuf {
    destination.join(STAGING_DIR_NAME)
}

/// True iff the staging directory exists, is a directory and has at least one entry.
pub fn is_packaging_ready(destination: &Path) -> bool {
    is_live(&staging_dir(destination))
}

pub(crate) fn is_live(staging_root: &Path) -> bool {
    staging_root.is_dir()
        && fs::read_dir(staging_root)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
}

pub fn next_action(destination: &Path) -> NextAction {
    if is_packaging_ready(destination) {
        NextAction::Package
    } else {
        NextAction::Copy
    }
}

/// Removes every file, then every emptied directory bottom-up, then `staging_root`.
///
/// Best-effort: individual failures are logged and skipped.
pub fn cleanup(staging_root: &Path) {
    let Ok(entries) = fs::read_dir(staging_root) else {
        tracing::debug!("cleanup: cannot list {}", staging_root.display());
        let _ = fs::remove_dir(staging_root);
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            cleanup(&path);
        } else if let Err(e) = fs::remove_file(&path) {
            tracing::warn!("cleanup: could not delete {}: {}", path.display(), e);
        }
    }

    if let Err(e) = fs::remove_dir(staging_root) {
        tracing::warn!("cleanup: could not remove {}: {}", staging_root.display(), e);
    }
}
