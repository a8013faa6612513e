//! Command-line front-end: runs engine operations on a background thread and
//! renders their progress notifications on stderr.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::cli::{self, Commands};
use crate::config::BackupConfig;
use crate::error::BackupError;
use crate::inspect;
use crate::package::PackageReport;
use crate::progress::ProgressState;
use crate::runner::{self, Operation};
use crate::staging;

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;
    let config = command.config();

    match &command {
        Commands::Copy { progress, .. } => {
            let staging_root = config.staging_root();
            let op = runner::spawn_copy(config)?;
            let copied = drive(op, "copy", *progress)?;
            println!("Copied {} files into {}", copied, staging_root.display());
        }
        Commands::Package { progress, json, .. } => {
            let op = runner::spawn_package(config)?;
            let report = drive(op, "package", *progress)?;
            print_report(&report, *json)?;
        }
        Commands::Backup { progress, json, .. } => {
            let op = runner::spawn_backup(config)?;
            let report = drive(op, "backup", *progress)?;
            print_report(&report, *json)?;
        }
        Commands::Status { .. } => {
            println!("{}", staging::next_action(&config.destination));
        }
        Commands::List { .. } => list(&config)?,
    }

    Ok(())
}

/// Waits for a background operation, repainting the progress bar as updates arrive.
fn drive<T>(op: Operation<T>, operation: &str, show_progress: bool) -> Result<T, BackupError> {
    if show_progress {
        let mut bar = ProgressBar::new(operation);
        let rx = op.progress().clone();
        while !op.is_finished() {
            if let Ok(state) = rx.recv_timeout(Duration::from_millis(100)) {
                // Coalesce: only the newest pending value is worth drawing.
                let latest = rx.try_iter().last().unwrap_or(state);
                bar.draw(latest);
            }
        }
        if let Some(last) = rx.try_iter().last() {
            bar.draw(last);
        }
        bar.done();
    }
    op.wait()
}

fn print_report(report: &PackageReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for archive in &report.archives {
        println!(
            "{}: {} files, {} bytes",
            archive.file_name,
            archive.entries.len(),
            archive.declared_bytes
        );
    }
    println!(
        "Packaged {} of {} files into {} archive(s)",
        report.archived_count(),
        report.total,
        report.archives.len()
    );
    if !report.failures.is_empty() {
        println!("{} file(s) could not be archived; see backup.log", report.failures.len());
    }
    Ok(())
}

fn list(config: &BackupConfig) -> Result<(), BackupError> {
    for (_, path) in inspect::list_archives(&config.destination)? {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        println!("{}", name);
        for entry in inspect::list_entries(&path)? {
            println!("  {}", entry);
        }
    }
    Ok(())
}

// --- utils for CLI progress -------------------------------------------------

struct ProgressBar {
    operation: String,
    start_time: Instant,
    prev_len: usize,
    drawn: bool,
}

impl ProgressBar {
    fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_uppercase(),
            start_time: Instant::now(),
            prev_len: 0,
            drawn: false,
        }
    }

    fn draw(&mut self, state: ProgressState) {
        let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);

        let elapsed = self.start_time.elapsed().as_secs_f32();
        let rate = if elapsed > 0.0 { state.processed as f32 / elapsed } else { 0.0 };

        let mut bar_width: usize = 40;
        let status_line = loop {
            let filled = ((state.percent() / 100.0) * bar_width as f32) as usize;
            let empty = bar_width - filled.min(bar_width);
            let line = format!(
                "[{}] [{}{}] {:.1}% | {}/{} files | {:.1} files/s",
                self.operation,
                "█".repeat(filled.min(bar_width)),
                "░".repeat(empty),
                state.percent(),
                state.processed,
                state.total,
                rate
            );
            if line.chars().count() <= term_width || bar_width <= 10 {
                break line;
            }
            bar_width -= 4;
        };

        // Pad over leftovers of a longer previous line.
        let len = status_line.chars().count();
        let padding = " ".repeat(self.prev_len.saturating_sub(len));
        self.prev_len = len;
        self.drawn = true;

        eprint!("\r\x1B[2K{}{}", status_line, padding);
        io::stderr().flush().ok();
    }

    fn done(&mut self) {
        if self.drawn {
            eprintln!();
        }
    }
}
