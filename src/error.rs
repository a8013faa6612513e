use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all fatal operations in the `zipstage` crate.
///
/// Per-entry packaging failures are not represented here: they are recovered,
/// written to the backup log and collected in [`crate::package::PackageReport`].
#[derive(Debug, Error)]
pub enum BackupError {
    /// The source or destination root was left empty.
    #[error("source and destination directories must both be set")]
    SourceOrDestinationUnset,

    /// Packaging was requested before a copy populated the staging directory
    /// (missing, not a directory, or empty).
    #[error("staging directory '{}' is missing or empty; copy the files first", path.display())]
    MissingStagingDirectory { path: PathBuf },

    /// The source root is missing or is not a directory.
    #[error("source directory '{}' does not exist or is not a directory", path.display())]
    InvalidSource { path: PathBuf },

    /// Copy was requested while staged files are still waiting to be packaged.
    #[error("staging directory '{}' already holds files; package them first", path.display())]
    StagingNotEmpty { path: PathBuf },

    /// A file could not be read or written during the copy phase.
    /// Aborts the remainder of the copy run.
    #[error("I/O error on path '{}': {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An archive could not be created or finalized.
    #[error("ZIP error on archive '{}': {source}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Any other I/O failure on the destination side (log file, staging setup).
    #[error("I/O error on path '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A split size that is neither a known option nor a positive byte count.
    #[error("invalid split size '{0}': expected e.g. '100 MB', '200 MB', '500 MB' or a positive byte count")]
    InvalidSplitSize(String),
}

impl BackupError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::FileIo { path: path.into(), source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io { path: path.into(), source }
    }

    pub(crate) fn zip(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        BackupError::Zip { path: path.into(), source }
    }
}

pub type Result<T, E = BackupError> = std::result::Result<T, E>;
