//! Recursive enumeration of regular files under a root directory.
//!
//! Counting and listing share one traversal so they always agree, and the
//! order is stable (entries sorted by file name, depth-first) so the same tree
//! always packs into the same archives.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::common::FileEntry;

/// Yields every non-directory below `root` together with its path relative to `root`.
///
/// Unreadable directories, including `root` itself, contribute nothing.
fn walk_files(root: &Path) -> impl Iterator<Item = (PathBuf, PathBuf)> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!("skipping unreadable entry under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|e| !e.file_type().is_dir())
        .filter_map(move |e| {
            let rel = e.path().strip_prefix(root).ok()?.to_path_buf();
            Some((e.into_path(), rel))
        })
}

/// Number of regular files reachable from `root`; directories count as zero.
pub fn count_files(root: &Path) -> u64 {
    walk_files(root).count() as u64
}

/// Lists every regular file under `root` as a [`FileEntry`] whose relative
/// path starts with `base` followed by the forward-slash joined path below `root`.
pub fn collect_files(root: &Path, base: &str) -> Vec<FileEntry> {
    walk_files(root)
        .map(|(abs, rel)| FileEntry::new(abs, join_relative(base, &rel)))
        .collect()
}

/// Joins path components with `/` regardless of the host separator.
pub(crate) fn join_relative(base: &str, rel: &Path) -> String {
    let mut out = String::from(base);
    for comp in rel.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&comp.as_os_str().to_string_lossy());
    }
    out
}
