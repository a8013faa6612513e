//! Run configuration shared by the engine entry points.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::SplitSize;
use crate::error::{BackupError, Result};
use crate::staging;

/// Everything a copy or packaging run needs to know.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Tree to back up. Only needed for the copy phase.
    pub source: PathBuf,
    /// Holds the staging directory, the archives and `backup.log`.
    pub destination: PathBuf,
    #[serde(default)]
    pub split_size: SplitSize,
    #[serde(default = "default_start_index")]
    pub start_index: u32,
}

fn default_start_index() -> u32 {
    1
}

impl BackupConfig {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            split_size: SplitSize::default(),
            start_index: default_start_index(),
        }
    }

    pub fn with_split_size(mut self, split_size: SplitSize) -> Self {
        self.split_size = split_size;
        self
    }

    pub fn with_start_index(mut self, start_index: u32) -> Self {
        self.start_index = start_index.max(1);
        self
    }

    pub fn staging_root(&self) -> PathBuf {
        staging::staging_dir(&self.destination)
    }

    /// Both roots must be set before a copy starts.
    pub fn require_source_and_destination(&self) -> Result<()> {
        if is_unset(&self.source) || is_unset(&self.destination) {
            return Err(BackupError::SourceOrDestinationUnset);
        }
        Ok(())
    }

    /// Packaging only reads the destination.
    pub fn require_destination(&self) -> Result<()> {
        if is_unset(&self.destination) {
            return Err(BackupError::SourceOrDestinationUnset);
        }
        Ok(())
    }
}

fn is_unset(path: &Path) -> bool {
    path.as_os_str().is_empty()
}
