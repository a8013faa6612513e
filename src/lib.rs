//! # zipstage Core Library
//!
//! A two-phase backup engine. The first phase mirrors a source tree into
//! `<destination>/staging`; the second packs the staged tree into
//! `backup_<N>.zip` archives no larger than a configured split size and
//! appends a manifest of the run to `<destination>/backup.log`.
//!
//! The presence of a non-empty staging directory is the only state: it is
//! re-read from disk on every check and decides whether copying or packaging
//! is the permitted next step.
//!
//! ## Key Modules
//!
//! - [`walk`]: Recursive file counting and listing.
//! - [`copy`]: Streams a source tree into the staging directory.
//! - [`package`]: Splits the staged tree into size-capped ZIP archives and writes the log.
//! - [`staging`]: Readiness predicate and cleanup of the staging directory.
//! - [`runner`]: Foreground and background entry points for front-ends.
//! - [`progress`]: Atomic progress counter with callback or channel delivery.
//!
//! ## Examples
//!
//! ```no_run
//! use zipstage::{runner, BackupConfig, ProgressTracker, SplitSize};
//!
//! # fn main() -> Result<(), zipstage::BackupError> {
//! let config = BackupConfig::new("/home/me/photos", "/mnt/backup")
//!     .with_split_size(SplitSize::MB_200);
//! let progress = ProgressTracker::new();
//!
//! runner::run_copy(&config, &progress)?;
//! let report = runner::run_package(&config, &progress)?;
//! println!("{} archives written", report.archives.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod config;
pub mod copy;
pub mod error;
pub mod inspect;
pub mod package;
pub mod progress;
pub mod runner;
pub mod staging;
pub mod walk;

pub use common::{FileEntry, SplitSize};
pub use config::BackupConfig;
pub use error::BackupError;
pub use package::{PackageOptions, PackageReport};
pub use progress::{ProgressState, ProgressTracker};
pub use staging::{is_packaging_ready, NextAction};
