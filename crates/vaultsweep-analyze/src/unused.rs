//! Unused attachment detection.
//!
//! An attachment is unused when its exact vault path is absent from the
//! referenced set built by [`ReferenceCollector`].

use serde::Serialize;

use vaultsweep_core::{ScanMode, ScanWarning, Vault, VaultFile};

use crate::references::{ReferenceCollector, ReferenceConfig, ReferencedPathSet};

/// Attachments a sweep in `mode` considers, in enumeration order.
pub fn attachments_in_vault(files: &[VaultFile], mode: ScanMode) -> Vec<&VaultFile> {
    files.iter().filter(|f| f.is_attachment_for(mode)).collect()
}

/// Results from unused attachment detection.
#[derive(Debug, Clone, Serialize)]
pub struct UnusedReport {
    /// Mode the scan ran in.
    pub mode: ScanMode,

    /// Unreferenced attachments, in vault enumeration order.
    pub unused: Vec<VaultFile>,

    /// Number of attachments considered.
    pub attachments_scanned: usize,

    /// Every path referenced by some document.
    pub referenced_paths: ReferencedPathSet,

    /// Documents whose contents were skipped.
    pub warnings: Vec<ScanWarning>,
}

impl UnusedReport {
    /// Check if nothing is unused.
    pub fn is_empty(&self) -> bool {
        self.unused.is_empty()
    }

    /// Combined size of the unused attachments.
    pub fn total_size(&self) -> u64 {
        self.unused.iter().map(|f| f.size).sum()
    }
}

/// Finds attachments that no document references.
#[derive(Debug, Default)]
pub struct UnusedFinder {
    collector: ReferenceCollector,
}

impl UnusedFinder {
    /// Create a finder with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finder with custom reference collection config.
    pub fn with_config(config: ReferenceConfig) -> Self {
        Self {
            collector: ReferenceCollector::with_config(config),
        }
    }

    /// Compute the unused attachments for `mode`.
    pub fn find_unused<V>(&self, vault: &V, mode: ScanMode) -> UnusedReport
    where
        V: Vault + ?Sized,
    {
        let files = vault.files();
        let attachments = attachments_in_vault(&files, mode);
        let references = self.collector.collect(vault);

        let unused: Vec<VaultFile> = attachments
            .iter()
            .filter(|f| !references.paths.contains(&f.path))
            .map(|f| (*f).clone())
            .collect();

        tracing::debug!(
            %mode,
            attachments = attachments.len(),
            unused = unused.len(),
            "unused scan finished"
        );

        UnusedReport {
            mode,
            unused,
            attachments_scanned: attachments.len(),
            referenced_paths: references.paths,
            warnings: references.warnings,
        }
    }
}
