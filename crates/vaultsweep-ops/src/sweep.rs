//! The full scan-then-dispose pipeline.

use chrono::{DateTime, Local};
use serde::Serialize;

use vaultsweep_analyze::{UnusedFinder, UnusedReport};
use vaultsweep_core::{DisposalConfig, ScanMode, ScanWarning, Vault, VaultFile};

use crate::disposal::{DisposalReport, LogEntry, dispose};

/// Timestamp format used in the cleanup log.
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Report of a sweep that found candidates and ran disposal over them.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub mode: ScanMode,
    /// Unused files found before exclusion filtering.
    pub candidates: usize,
    /// Attachments considered by the scan.
    pub attachments_scanned: usize,
    pub disposal: DisposalReport,
    /// Documents whose contents were skipped during the scan.
    pub warnings: Vec<ScanWarning>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl SweepReport {
    /// Assemble a report from the scan and disposal halves of a sweep.
    pub fn new(
        unused: &UnusedReport,
        disposal: DisposalReport,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
    ) -> Self {
        Self {
            mode: unused.mode,
            candidates: unused.unused.len(),
            attachments_scanned: unused.attachments_scanned,
            warnings: unused.warnings.clone(),
            disposal,
            started_at,
            finished_at,
        }
    }

    /// Number of files actually removed.
    pub fn removed(&self) -> usize {
        self.disposal.removed
    }

    /// The complete cleanup log, framed by start and finish lines.
    pub fn log(&self) -> Vec<LogEntry> {
        let mut log = Vec::with_capacity(self.disposal.log.len() + 3);
        log.push(LogEntry::info(format!(
            "{}: Cleanup started",
            self.started_at.format(LOG_TIMESTAMP_FORMAT)
        )));
        log.extend(self.disposal.log.iter().cloned());
        log.push(LogEntry::info(format!(
            "{} file(s) removed.",
            self.disposal.removed
        )));
        log.push(LogEntry::info(format!(
            "{}: Cleanup finished",
            self.finished_at.format(LOG_TIMESTAMP_FORMAT)
        )));
        log
    }
}

/// Outcome of [`scan_and_dispose`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Every attachment is referenced; nothing was touched.
    NothingToDo {
        mode: ScanMode,
        warnings: Vec<ScanWarning>,
    },
    /// Disposal ran over the unused files, possibly removing none.
    Completed(SweepReport),
}

impl SweepOutcome {
    /// Number of files removed.
    pub fn removed(&self) -> usize {
        match self {
            Self::NothingToDo { .. } => 0,
            Self::Completed(report) => report.removed(),
        }
    }

    /// One-line summary for the user.
    pub fn summary(&self) -> String {
        match self {
            Self::NothingToDo { mode, .. } => {
                format!("All {} are in use. Nothing was deleted.", mode.noun())
            }
            Self::Completed(report) => {
                format!("{} file(s) removed.", report.removed())
            }
        }
    }

    /// Scan warnings from either outcome.
    pub fn warnings(&self) -> &[ScanWarning] {
        match self {
            Self::NothingToDo { warnings, .. } => warnings,
            Self::Completed(report) => &report.warnings,
        }
    }
}

/// A sweep whose scan has run and whose disposal is still to come.
///
/// Callers that drive disposal themselves (on a runtime, or after asking
/// the user) scan with [`PendingSweep::scan`] and close the sweep with
/// [`PendingSweep::finish`].
#[derive(Debug, Clone)]
pub struct PendingSweep {
    unused: UnusedReport,
    started_at: DateTime<Local>,
}

impl PendingSweep {
    /// Find the unused attachments for `mode`.
    pub fn scan<V>(vault: &V, mode: ScanMode) -> Self
    where
        V: Vault + ?Sized,
    {
        let started_at = Local::now();
        Self {
            unused: UnusedFinder::new().find_unused(vault, mode),
            started_at,
        }
    }

    /// The scan result.
    pub fn unused(&self) -> &UnusedReport {
        &self.unused
    }

    /// Files to hand to disposal.
    pub fn files(&self) -> &[VaultFile] {
        &self.unused.unused
    }

    /// Whether every attachment is referenced.
    pub fn is_empty(&self) -> bool {
        self.unused.is_empty()
    }

    /// Close the sweep with the disposal run over [`files`](Self::files).
    ///
    /// A sweep with no unused files is `NothingToDo` and `disposal` is
    /// ignored.
    pub fn finish(self, disposal: DisposalReport) -> SweepOutcome {
        if self.unused.is_empty() {
            tracing::info!(mode = %self.unused.mode, "no unused files");
            return SweepOutcome::NothingToDo {
                mode: self.unused.mode,
                warnings: self.unused.warnings,
            };
        }
        SweepOutcome::Completed(SweepReport::new(
            &self.unused,
            disposal,
            self.started_at,
            Local::now(),
        ))
    }
}

/// Find the unused attachments for `mode` and dispose of them per `config`.
pub fn scan_and_dispose<V>(vault: &V, mode: ScanMode, config: &DisposalConfig) -> SweepOutcome
where
    V: Vault + ?Sized,
{
    let pending = PendingSweep::scan(vault, mode);
    let disposal = if pending.is_empty() {
        DisposalReport::new(config.delete_option)
    } else {
        dispose(vault, pending.files(), config)
    };
    pending.finish(disposal)
}
