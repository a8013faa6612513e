//! Mirrors a source tree into the staging directory.
//!
//! Files are streamed one at a time through a fixed buffer. The first failure
//! aborts the run; whatever was already copied stays in place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{BackupError, Result};
use crate::progress::ProgressTracker;
use crate::walk;

/// Size of the copy buffer.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copies every regular file under `source` to the same relative path under
/// `destination`, creating directories as needed and overwriting existing files.
///
/// `progress` is started with the source file count and bumped after each file.
/// Returns the number of files copied.
///
/// Symbolic links are not followed. A link to a directory is treated as a
/// single file, so reading it fails and aborts the run rather than copying
/// the linked tree.
pub fn copy_tree(source: &Path, destination: &Path, progress: &ProgressTracker) -> Result<u64> {
    let files = walk::collect_files(source, "");
    progress.start(files.len() as u64);

    fs::create_dir_all(destination).map_err(|e| BackupError::file_io(destination, e))?;

    let mut copied = 0u64;
    for entry in &files {
        let target = destination.join(&entry.relative_path);
        copy_file(&entry.absolute_path, &target)?;
        copied = progress.record_file();
        tracing::debug!("copied {}", entry.relative_path);
    }

    progress.finish();
    tracing::info!("copied {} files from {} to {}", copied, source.display(), destination.display());
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| BackupError::file_io(parent, e))?;
    }

    let input = File::open(from).map_err(|e| BackupError::file_io(from, e))?;
    let output = File::create(to).map_err(|e| BackupError::file_io(to, e))?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, input);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, output);
    std::io::copy(&mut reader, &mut writer).map_err(|e| BackupError::file_io(from, e))?;
    writer.flush().map_err(|e| BackupError::file_io(to, e))?;
    Ok(())
}
