//! # Size-capped ZIP packaging
//!
//! Packs a staged tree into `backup_<N>.zip` archives under the destination.
//!
//! Files are taken in traversal order and appended to the current archive
//! until the next file's declared size would push the archive past the split
//! size. Rotation only happens when the current archive already holds data,
//! so a file larger than the split size still lands, alone, in a fresh archive.
//! Sizes are the uncompressed on-disk sizes, never the compressed ones.
//!
//! A file that cannot be archived is logged and skipped; the run carries on.

pub mod log;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::common::{archive_file_name, FileEntry, SplitSize, COMPRESSION_LEVEL, LOG_FILE_NAME};
use crate::error::{BackupError, Result};
use crate::progress::ProgressTracker;
use crate::walk;

pub use self::log::BackupLog;

/// Inputs of one packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// The staged tree. Its own folder name becomes the top path segment of every entry.
    pub staging_root: PathBuf,
    /// Where archives and `backup.log` are written.
    pub destination: PathBuf,
    pub split_size: SplitSize,
    /// Index of the first archive written by this run.
    pub start_index: u32,
}

/// One archive produced by a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveSummary {
    pub index: u32,
    pub file_name: String,
    pub path: PathBuf,
    /// In-archive entry names, in the order they were written.
    pub entries: Vec<String>,
    /// Sum of the declared sizes of `entries`.
    pub declared_bytes: u64,
}

/// A file that could not be archived.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFailure {
    pub path: String,
    pub reason: String,
}

/// Outcome of a packaging run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageReport {
    pub archives: Vec<ArchiveSummary>,
    pub failures: Vec<EntryFailure>,
    /// Files handled so far, counting entries that failed and were skipped
    /// as well as archived ones; equals `total` once the run completes.
    pub processed: u64,
    /// Files found in the staging tree at the start of the run.
    pub total: u64,
}

impl PackageReport {
    pub fn archived_count(&self) -> usize {
        self.archives.iter().map(|a| a.entries.len()).sum()
    }
}

/// The archive currently being filled.
struct OpenArchive {
    writer: ZipWriter<BufWriter<File>>,
    summary: ArchiveSummary,
}

impl OpenArchive {
    fn create(destination: &Path, index: u32) -> Result<Self> {
        let file_name = archive_file_name(index);
        let path = destination.join(&file_name);
        let file = File::create(&path).map_err(|e| BackupError::io(&path, e))?;
        tracing::info!("opened archive {}", path.display());
        Ok(Self {
            writer: ZipWriter::new(BufWriter::new(file)),
            summary: ArchiveSummary {
                index,
                file_name,
                path,
                entries: Vec::new(),
                declared_bytes: 0,
            },
        })
    }

    fn is_empty(&self) -> bool {
        self.summary.declared_bytes == 0
    }

    /// Streams one file into the archive. On failure the partial entry is discarded.
    fn add(&mut self, entry: &FileEntry, declared_size: u64) -> Result<(), ZipError> {
        let mut input = File::open(&entry.absolute_path)?;

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL))
            .large_file(declared_size >= u64::from(u32::MAX));
        self.writer.start_file(entry.relative_path.as_str(), options)?;

        if let Err(e) = std::io::copy(&mut input, &mut self.writer) {
            let _ = self.writer.abort_file();
            return Err(e.into());
        }

        self.summary.entries.push(entry.relative_path.clone());
        self.summary.declared_bytes += declared_size;
        Ok(())
    }

    fn finish(self) -> Result<ArchiveSummary> {
        let OpenArchive { writer, summary } = self;
        let mut inner = writer.finish().map_err(|e| BackupError::zip(&summary.path, e))?;
        inner.flush().map_err(|e| BackupError::io(&summary.path, e))?;
        tracing::info!(
            "closed archive {} ({} entries, {} bytes declared)",
            summary.file_name,
            summary.entries.len(),
            summary.declared_bytes
        );
        Ok(summary)
    }
}

/// Log text for a failed entry: the underlying I/O message when there is one.
fn failure_reason(err: &ZipError) -> String {
    match err {
        ZipError::Io(io) => io.to_string(),
        other => other.to_string(),
    }
}

/// Top path segment used for entries: the staging folder's own name.
fn base_name(staging_root: &Path) -> String {
    staging_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Packs the staged tree into a sequence of size-capped archives and appends
/// the run to `<destination>/backup.log`.
///
/// Fails with [`BackupError::MissingStagingDirectory`] before writing anything
/// when the staging root is absent. Per-file read failures are recorded in the
/// report and the log; only archive or log I/O failures abort the run.
pub fn package_tree(options: &PackageOptions, progress: &ProgressTracker) -> Result<PackageReport> {
    let staging_root = options.staging_root.as_path();
    if !staging_root.is_dir() {
        return Err(BackupError::MissingStagingDirectory {
            path: staging_root.to_path_buf(),
        });
    }

    let entries = walk::collect_files(staging_root, &base_name(staging_root));
    let mut report = PackageReport {
        total: entries.len() as u64,
        ..PackageReport::default()
    };
    progress.start(report.total);

    let mut log = BackupLog::open_append(&options.destination.join(LOG_FILE_NAME))?;
    let cap = options.split_size.bytes();
    let mut index = options.start_index;

    let mut archive = OpenArchive::create(&options.destination, index)?;
    log.run_header(chrono::Local::now())?;
    log.archive_marker(&archive.summary.file_name)?;

    for entry in &entries {
        let size = entry.declared_size();

        if !archive.is_empty() && archive.summary.declared_bytes.saturating_add(size) > cap {
            report.archives.push(archive.finish()?);
            index += 1;
            archive = OpenArchive::create(&options.destination, index)?;
            log.archive_marker(&archive.summary.file_name)?;
        }

        match archive.add(entry, size) {
            Ok(()) => {
                log.entry_archived(&entry.relative_path)?;
                tracing::debug!("archived {} into {}", entry.relative_path, archive.summary.file_name);
            }
            Err(e) => {
                let reason = failure_reason(&e);
                tracing::warn!("could not archive {}: {}", entry.relative_path, reason);
                log.entry_failed(&entry.relative_path, &reason)?;
                report.failures.push(EntryFailure {
                    path: entry.relative_path.clone(),
                    reason,
                });
            }
        }
        report.processed = progress.record_file();
    }

    report.archives.push(archive.finish()?);
    progress.finish();

    tracing::info!(
        "packaged {} of {} files into {} archive(s)",
        report.archived_count(),
        report.total,
        report.archives.len()
    );
    Ok(report)
}
