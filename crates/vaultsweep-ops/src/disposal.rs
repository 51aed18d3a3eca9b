//! Disposal of unused files.
//!
//! Files are processed one at a time in the order given. Excluded files are
//! skipped; a file the vault refuses to remove is logged and the run carries
//! on with the next one.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use vaultsweep_core::{DeleteOption, DisposalConfig, Vault, VaultError, VaultFile};

use crate::OPERATION_CHANNEL_SIZE;
use crate::progress::{DisposalEvent, DisposalProgress};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Normal progress.
    Info,
    /// A file left alone on purpose.
    Skip,
    /// A file that could not be removed.
    Error,
}

impl LogLevel {
    /// Line prefix used in rendered logs.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Info => "[+]",
            Self::Skip => "[-]",
            Self::Error => "[!]",
        }
    }
}

/// A single line of the disposal log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Severity, rendered as the line marker.
    pub level: LogLevel,
    /// Text after the marker.
    pub message: String,
}

impl LogEntry {
    /// A [`LogLevel::Info`] line.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Info,
            message: message.into(),
        }
    }

    /// A [`LogLevel::Skip`] line, for files left in place.
    pub fn skip(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Skip,
            message: message.into(),
        }
    }

    /// A [`LogLevel::Error`] line, for files that could not be removed.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: LogLevel::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.level.marker(), self.message)
    }
}

/// A file the vault refused to remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalError {
    /// Vault path of the file.
    pub path: String,
    /// A human-readable error message.
    pub message: String,
}

impl std::fmt::Display for DisposalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Result of a disposal run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisposalReport {
    /// How files were removed.
    pub delete_option: DeleteOption,
    /// Files actually removed.
    pub removed: usize,
    /// Files the vault refused to remove.
    pub failed: usize,
    /// Files skipped because their folder is excluded.
    pub skipped: usize,
    /// Combined size of the removed files.
    pub bytes_freed: u64,
    /// Failures, in processing order.
    pub errors: Vec<DisposalError>,
    /// Per-file log lines, in processing order.
    pub log: Vec<LogEntry>,
}

impl DisposalReport {
    /// Create an empty report for a run using `delete_option`.
    pub fn new(delete_option: DeleteOption) -> Self {
        Self {
            delete_option,
            ..Default::default()
        }
    }

    /// Check if every non-excluded file was removed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record_removed(&mut self, file: &VaultFile) {
        tracing::info!(path = %file.path, action = %self.delete_option, "removed unused file");
        self.removed += 1;
        self.bytes_freed += file.size;
        let action = match self.delete_option {
            DeleteOption::VaultTrash => "Moved to vault trash",
            DeleteOption::SystemTrash => "Moved to system trash",
            DeleteOption::Permanent => "Deleted permanently",
        };
        self.log.push(LogEntry::info(format!("{action}: {}", file.path)));
    }

    fn record_failed(&mut self, file: &VaultFile, message: String) {
        tracing::warn!(path = %file.path, error = %message, "failed to remove file");
        self.failed += 1;
        self.log.push(LogEntry::error(format!(
            "Failed to remove {}: {message}",
            file.path
        )));
        self.errors.push(DisposalError {
            path: file.path.clone(),
            message,
        });
    }

    fn record_skipped(&mut self, file: &VaultFile) {
        tracing::debug!(path = %file.path, "skipping file in excluded folder");
        self.skipped += 1;
        self.log.push(LogEntry::skip(format!(
            "Skipped (excluded folder): {}",
            file.path
        )));
    }
}

/// Remove one file the way `option` says.
fn dispose_file<V>(vault: &V, path: &str, option: DeleteOption) -> Result<(), VaultError>
where
    V: Vault + ?Sized,
{
    match option {
        DeleteOption::VaultTrash => vault.trash(path, false),
        DeleteOption::SystemTrash => vault.trash(path, true),
        DeleteOption::Permanent => vault.delete(path),
    }
}

/// Dispose of `files` in order, skipping excluded folders.
pub fn dispose<V>(vault: &V, files: &[VaultFile], config: &DisposalConfig) -> DisposalReport
where
    V: Vault + ?Sized,
{
    let mut report = DisposalReport::new(config.delete_option);

    for file in files {
        if config.exclusion.is_excluded(file) {
            report.record_skipped(file);
            continue;
        }
        match dispose_file(vault, &file.path, config.delete_option) {
            Ok(()) => report.record_removed(file),
            Err(e) => report.record_failed(file, e.to_string()),
        }
    }

    report
}

/// Start background disposal of `files`.
///
/// Files are still removed one at a time; each vault call runs on the
/// blocking pool. The last event is always [`DisposalEvent::Complete`].
pub fn start_disposal(
    vault: Arc<dyn Vault>,
    files: Vec<VaultFile>,
    config: DisposalConfig,
) -> mpsc::Receiver<DisposalEvent> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::spawn(async move {
        disposal_impl(vault, files, config, tx).await;
    });

    rx
}

async fn disposal_impl(
    vault: Arc<dyn Vault>,
    files: Vec<VaultFile>,
    config: DisposalConfig,
    tx: mpsc::Sender<DisposalEvent>,
) {
    let total = files.len();
    let mut report = DisposalReport::new(config.delete_option);

    for file in &files {
        let _ = tx
            .send(DisposalEvent::Progress(DisposalProgress::from_report(
                total,
                &report,
                Some(file.path.clone()),
            )))
            .await;

        if config.exclusion.is_excluded(file) {
            report.record_skipped(file);
            continue;
        }

        // Perform the vault call in a blocking task to not block the async runtime
        let vault = Arc::clone(&vault);
        let path = file.path.clone();
        let option = config.delete_option;
        let result =
            tokio::task::spawn_blocking(move || dispose_file(vault.as_ref(), &path, option)).await;

        match result {
            Ok(Ok(())) => report.record_removed(file),
            Ok(Err(e)) => report.record_failed(file, e.to_string()),
            Err(e) => report.record_failed(file, format!("task failed: {e}")),
        }
    }

    let _ = tx
        .send(DisposalEvent::Progress(DisposalProgress::from_report(
            total, &report, None,
        )))
        .await;
    let _ = tx.send(DisposalEvent::Complete(report)).await;
}
