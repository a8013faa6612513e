//! Engine entry points used by front-ends.
//!
//! `run_*` execute an operation on the calling thread; `spawn_*` move it to a
//! background thread and hand back a progress receiver the caller can poll.
//! None of them keep state between calls: the staging directory on disk
//! decides what is allowed next.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

use crate::config::BackupConfig;
use crate::copy;
use crate::error::{BackupError, Result};
use crate::package::{self, PackageOptions, PackageReport};
use crate::progress::{self, ProgressState, ProgressTracker};
use crate::staging;

/// Copies the configured source into `<destination>/staging`.
///
/// Refused while staging still holds files from an earlier copy.
pub fn run_copy(config: &BackupConfig, progress: &ProgressTracker) -> Result<u64> {
    config.require_source_and_destination()?;
    if !config.source.is_dir() {
        return Err(BackupError::InvalidSource {
            path: config.source.clone(),
        });
    }
    if staging::is_packaging_ready(&config.destination) {
        return Err(BackupError::StagingNotEmpty {
            path: config.staging_root(),
        });
    }

    tracing::info!("copy phase: {} -> {}", config.source.display(), config.staging_root().display());
    copy::copy_tree(&config.source, &config.staging_root(), progress)
}

/// Packs `<destination>/staging` into archives, then deletes the staging tree.
///
/// Refused unless staging exists and holds at least one entry.
pub fn run_package(config: &BackupConfig, progress: &ProgressTracker) -> Result<PackageReport> {
    config.require_destination()?;
    if !staging::is_packaging_ready(&config.destination) {
        return Err(BackupError::MissingStagingDirectory {
            path: config.staging_root(),
        });
    }

    let options = PackageOptions {
        staging_root: config.staging_root(),
        destination: config.destination.clone(),
        split_size: config.split_size,
        start_index: config.start_index,
    };
    tracing::info!(
        "package phase: {} (split size {})",
        options.staging_root.display(),
        options.split_size
    );
    let report = package::package_tree(&options, progress)?;

    staging::cleanup(&options.staging_root);
    Ok(report)
}

/// Copy followed by package, each gated the same way as when run on its own.
pub fn run_backup(config: &BackupConfig, progress: &ProgressTracker) -> Result<PackageReport> {
    run_copy(config, progress)?;
    run_package(config, progress)
}

/// A long-running operation executing on its own thread.
pub struct Operation<T> {
    handle: JoinHandle<Result<T>>,
    progress: Receiver<ProgressState>,
}

impl<T> Operation<T> {
    /// Progress notifications, one per processed file. Intermediate values may be
    /// skipped by the reader; the final value is always sent.
    pub fn progress(&self) -> &Receiver<ProgressState> {
        &self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the operation ends and returns its outcome.
    pub fn wait(self) -> Result<T> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn spawn<T, F>(name: &str, config: BackupConfig, op: F) -> Result<Operation<T>>
where
    T: Send + 'static,
    F: FnOnce(&BackupConfig, &ProgressTracker) -> Result<T> + Send + 'static,
{
    let (tracker, rx) = progress::channel();
    let handle = thread::Builder::new()
        .name(format!("zipstage-{}", name))
        .spawn(move || op(&config, &tracker))
        .map_err(|e| BackupError::io(thread_label(name), e))?;
    Ok(Operation { handle, progress: rx })
}

fn thread_label(name: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(format!("<{} thread>", name))
}

pub fn spawn_copy(config: BackupConfig) -> Result<Operation<u64>> {
    spawn("copy", config, run_copy)
}

pub fn spawn_package(config: BackupConfig) -> Result<Operation<PackageReport>> {
    spawn("package", config, run_package)
}

pub fn spawn_backup(config: BackupConfig) -> Result<Operation<PackageReport>> {
    spawn("backup", config, run_backup)
}
