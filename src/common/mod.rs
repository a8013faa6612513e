//! Common types and constants shared by the copy and packaging phases.

use std::fmt;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BackupError;

/// Well-known name of the staging directory under the destination root.
pub const STAGING_DIR_NAME: &str = "staging";

/// Name of the append-only manifest log under the destination root.
pub const LOG_FILE_NAME: &str = "backup.log";

/// Bytes in one megabyte as used by the split size options.
pub const MEGABYTE: u64 = 1024 * 1024;

/// Deflate level used for every archive entry.
pub const COMPRESSION_LEVEL: i64 = 9;

/// File name of the archive with the given 1-based index, e.g. `backup_3.zip`.
pub fn archive_file_name(index: u32) -> String {
    format!("backup_{}.zip", index)
}

/// Parses an archive file name produced by [`archive_file_name`] back into its index.
pub fn parse_archive_index(name: &str) -> Option<u32> {
    name.strip_prefix("backup_")?
        .strip_suffix(".zip")?
        .parse()
        .ok()
}

/// A regular file found in a staged tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Where the file lives on disk.
    pub absolute_path: PathBuf,
    /// Forward-slash path rooted at the staging folder's own name; used as the in-archive name.
    pub relative_path: String,
}

impl FileEntry {
    pub fn new(absolute_path: PathBuf, relative_path: String) -> Self {
        Self { absolute_path, relative_path }
    }

    /// Size reported by the filesystem before compression.
    ///
    /// An unreadable file counts as zero bytes so that rotation decisions
    /// never fail; the read error surfaces when the entry is archived.
    pub fn declared_size(&self) -> u64 {
        std::fs::metadata(&self.absolute_path)
            .map(|m| m.len())
            .unwrap_or(0)
    }
}

/// Per-archive byte budget, counted in declared (uncompressed) source sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitSize(NonZeroU64);

impl SplitSize {
    pub const MB_100: SplitSize = SplitSize::from_megabytes_const(100);
    pub const MB_200: SplitSize = SplitSize::from_megabytes_const(200);
    pub const MB_500: SplitSize = SplitSize::from_megabytes_const(500);

    /// The discrete options offered to users.
    pub const PRESETS: [SplitSize; 3] = [Self::MB_100, Self::MB_200, Self::MB_500];

    const fn from_megabytes_const(mb: u64) -> Self {
        match NonZeroU64::new(mb * MEGABYTE) {
            Some(v) => SplitSize(v),
            None => panic!("split size must be non-zero"),
        }
    }

    /// Returns `None` for a zero byte count.
    pub fn from_bytes(bytes: u64) -> Option<Self> {
        NonZeroU64::new(bytes).map(SplitSize)
    }

    pub fn bytes(self) -> u64 {
        self.0.get()
    }
}

impl Default for SplitSize {
    fn default() -> Self {
        Self::MB_100
    }
}

impl fmt::Display for SplitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes();
        if bytes % MEGABYTE == 0 {
            write!(f, "{} MB", bytes / MEGABYTE)
        } else {
            write!(f, "{} bytes", bytes)
        }
    }
}

impl FromStr for SplitSize {
    type Err = BackupError;

    /// Accepts `"100 MB"`, `"200MB"`, `"500 mb"` style megabyte values or a bare byte count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BackupError::InvalidSplitSize(s.to_string());
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        let bytes = if let Some(mb) = lower.strip_suffix("mb") {
            mb.trim()
                .parse::<u64>()
                .ok()
                .and_then(|mb| mb.checked_mul(MEGABYTE))
                .ok_or_else(invalid)?
        } else {
            let digits = lower.strip_suffix('b').unwrap_or(&lower).trim();
            digits.parse::<u64>().map_err(|_| invalid())?
        };

        SplitSize::from_bytes(bytes).ok_or_else(invalid)
    }
}
