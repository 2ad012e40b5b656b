//! # Progress Reporting
//!
//! Hook invoked by the aggregator before each batch starts.

use serde::Serialize;
use std::fmt;
use tracing::info;

/// Snapshot of a run's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    /// Zero-based index of the batch about to start.
    pub batch: usize,
    /// Number of batches in the run.
    pub total_batches: usize,
    /// Share of batches already finished, `0..=100`.
    pub percent: u8,
    /// Locales priced so far.
    pub succeeded: usize,
    /// Locales failed so far.
    pub failed: usize,
}

impl BatchProgress {
    /// Creates a snapshot, deriving `percent`.
    #[must_use]
    pub fn new(batch: usize, total_batches: usize, succeeded: usize, failed: usize) -> Self {
        let percent = if total_batches == 0 {
            100
        } else {
            u8::try_from(batch.min(total_batches) * 100 / total_batches).unwrap_or(100)
        };
        Self {
            batch,
            total_batches,
            percent,
            succeeded,
            failed,
        }
    }
}

impl fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% ({}/{} batches), succeeded: {}, failed: {}",
            self.percent, self.batch, self.total_batches, self.succeeded, self.failed
        )
    }
}

/// Receives progress updates.
pub trait ProgressReporter: Send + Sync + fmt::Debug {
    /// Called before each batch.
    fn report(&self, progress: &BatchProgress);
}

/// Logs progress at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report(&self, progress: &BatchProgress) {
        info!(
            batch = progress.batch,
            total_batches = progress.total_batches,
            percent = progress.percent,
            succeeded = progress.succeeded,
            failed = progress.failed,
            "batch progress"
        );
    }
}
