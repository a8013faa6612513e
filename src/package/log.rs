//! The append-only `backup.log` manifest.
//!
//! Line formats are fixed; tools downstream parse them:
//!
//! ```text
//! Backup realizado em: 2024-05-01 13:37:00
//! Arquivo ZIP: backup_1.zip
//!  - staging/docs/a.txt
//! Erro ao compactar staging/locked.db: Permission denied (os error 13)
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{BackupError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Open handle on the manifest log. Every line is flushed as it is written;
/// the file is closed when the value is dropped.
pub struct BackupLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl BackupLog {
    /// Opens `path` for appending, creating it if needed. Existing content is never touched.
    pub fn open_append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BackupError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_header(&mut self, at: DateTime<Local>) -> Result<()> {
        self.line(format_args!("Backup realizado em: {}", at.format(TIMESTAMP_FORMAT)))
    }

    pub fn archive_marker(&mut self, archive_name: &str) -> Result<()> {
        self.line(format_args!("Arquivo ZIP: {}", archive_name))
    }

    pub fn entry_archived(&mut self, relative_path: &str) -> Result<()> {
        self.line(format_args!(" - {}", relative_path))
    }

    pub fn entry_failed(&mut self, relative_path: &str, reason: &dyn std::fmt::Display) -> Result<()> {
        self.line(format_args!("Erro ao compactar {}: {}", relative_path, reason))
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        self.write_line(args).map_err(|e| BackupError::io(&self.path, e))
    }

    fn write_line(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.writer.write_fmt(args)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
