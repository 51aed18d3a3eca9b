//! Progress reporting types for disposal runs.

use serde::Serialize;

use crate::disposal::DisposalReport;

/// Progress information for an ongoing disposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisposalProgress {
    /// Number of candidate files.
    pub total: usize,
    /// Files removed so far.
    pub removed: usize,
    /// Files the vault refused to remove.
    pub failed: usize,
    /// Files left alone because their folder is excluded.
    pub skipped: usize,
    /// Bytes freed so far.
    pub bytes_freed: u64,
    /// The file about to be processed.
    pub current: Option<String>,
}

impl DisposalProgress {
    /// Create a new progress tracker.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Snapshot the counters of a report in progress.
    pub fn from_report(total: usize, report: &DisposalReport, current: Option<String>) -> Self {
        Self {
            total,
            removed: report.removed,
            failed: report.failed,
            skipped: report.skipped,
            bytes_freed: report.bytes_freed,
            current,
        }
    }

    /// Files processed so far, whatever the outcome.
    pub fn processed(&self) -> usize {
        self.removed + self.failed + self.skipped
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.total > 0 {
            (self.processed() as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Event sent through the channel during an async disposal.
#[derive(Debug, Clone)]
pub enum DisposalEvent {
    /// Progress update.
    Progress(DisposalProgress),
    /// The disposal finished.
    Complete(DisposalReport),
}
