//! Progress tracking for copy and packaging runs.
//!
//! The running operation owns a [`ProgressTracker`] and bumps an atomic counter
//! after each file. Every bump is forwarded to an optional callback; a
//! presentation thread can instead consume [`channel`], which turns the
//! callback into a one-way notification stream.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver};
use serde::Serialize;

/// Snapshot of a run's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    /// Files handled so far in this run.
    pub processed: u64,
    /// Files found when the run started.
    pub total: u64,
}

impl ProgressState {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.processed as f32 / self.total as f32) * 100.0).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Progress callback function type
pub type ProgressCallback = dyn Fn(ProgressState) + Send + Sync;

/// Shared progress counter for a single run.
pub struct ProgressTracker {
    processed: AtomicU64,
    total: AtomicU64,
    callback: Option<Arc<ProgressCallback>>,
}

impl ProgressTracker {
    /// A tracker that counts but notifies nobody.
    pub fn new() -> Self {
        Self {
            processed: AtomicU64::new(0),
            total: AtomicU64::new(0),
            callback: None,
        }
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: Fn(ProgressState) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
            ..Self::new()
        }
    }

    /// Starts a new run: resets the counter and records the expected total.
    pub fn start(&self, total: u64) {
        self.processed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        self.emit();
    }

    /// Records one finished file and notifies. Returns the cumulative count.
    pub fn record_file(&self) -> u64 {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        self.emit();
        processed
    }

    /// Emits the final state once more so observers never miss it.
    pub fn finish(&self) {
        self.emit();
    }

    pub fn state(&self) -> ProgressState {
        ProgressState {
            processed: self.processed.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }

    fn emit(&self) {
        if let Some(ref callback) = self.callback {
            callback(self.state());
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a tracker whose notifications are delivered over a channel.
///
/// Sends never block; once the receiver is dropped updates are discarded.
pub fn channel() -> (ProgressTracker, Receiver<ProgressState>) {
    let (tx, rx) = unbounded();
    let tracker = ProgressTracker::with_callback(move |state| {
        let _ = tx.send(state);
    });
    (tracker, rx)
}
