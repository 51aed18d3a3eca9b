//! Collection of every path referenced anywhere in the vault.
//!
//! Sources, in order:
//! 1. The store's pre-resolved link index, when it has one.
//! 2. Each note's front-matter values and full text.
//! 3. Each canvas's file nodes and text nodes.
//!
//! The index alone is not enough: it can miss links that live only in
//! front-matter fields or canvas nodes.

use std::collections::HashSet;

use dashmap::DashSet;
use derive_builder::Builder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize, Serializer};

use vaultsweep_core::{
    Frontmatter, NOTE_EXTENSION, ScanWarning, Vault, VaultError, VaultFile, looks_like_image_path,
};

use crate::links::{embedded_wiki_target, extract_links};
use crate::resolve::resolve_link;

/// Set of referenced paths; only membership is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedPathSet(HashSet<String>);

impl ReferencedPathSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path; returns false if it was already present.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    /// Check membership.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Paths in lexical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.iter().collect();
        paths.sort_unstable();
        paths
    }
}

impl FromIterator<String> for ReferencedPathSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for ReferencedPathSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

/// Configuration for reference collection.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ReferenceConfig {
    /// Seed the set from the store's pre-resolved link index.
    #[builder(default = "true")]
    pub use_resolved_links: bool,

    /// Scan documents on the rayon thread pool.
    #[builder(default = "true")]
    pub parallel: bool,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            use_resolved_links: true,
            parallel: true,
        }
    }
}

impl ReferenceConfig {
    /// Create a new config builder.
    pub fn builder() -> ReferenceConfigBuilder {
        ReferenceConfigBuilder::default()
    }
}

/// Result of a full reference scan.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceReport {
    /// Every referenced path.
    pub paths: ReferencedPathSet,
    /// Number of notes and canvases scanned.
    pub documents_scanned: usize,
    /// Documents that were skipped in whole or part, sorted by path.
    pub warnings: Vec<ScanWarning>,
}

/// Minimal canvas shape: only nodes matter.
#[derive(Debug, Deserialize)]
struct CanvasDocument {
    #[serde(default)]
    nodes: Vec<CanvasNode>,
}

#[derive(Debug, Deserialize)]
struct CanvasNode {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Walks every note and canvas and gathers the paths they reference.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    config: ReferenceConfig,
}

impl ReferenceCollector {
    /// Create a collector with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector with custom config.
    pub fn with_config(config: ReferenceConfig) -> Self {
        Self { config }
    }

    /// Scan the whole vault.
    pub fn collect<V>(&self, vault: &V) -> ReferenceReport
    where
        V: Vault + ?Sized,
    {
        let referenced: DashSet<String> = DashSet::new();

        if self.config.use_resolved_links {
            if let Some(index) = vault.resolved_links() {
                let suffix = format!(".{NOTE_EXTENSION}");
                for targets in index.values() {
                    for target in targets.keys().filter(|t| !t.ends_with(&suffix)) {
                        referenced.insert(target.clone());
                    }
                }
            }
        }

        let files = vault.files();
        let documents: Vec<&VaultFile> = files
            .iter()
            .filter(|f| f.is_note() || f.is_canvas())
            .collect();

        let mut warnings: Vec<ScanWarning> = if self.config.parallel {
            documents
                .par_iter()
                .flat_map_iter(|file| self.scan_document(vault, file, &referenced))
                .collect()
        } else {
            documents
                .iter()
                .flat_map(|file| self.scan_document(vault, file, &referenced))
                .collect()
        };
        warnings.sort_by(|a, b| a.path.cmp(&b.path));

        let paths: ReferencedPathSet = referenced.into_iter().collect();
        tracing::debug!(
            documents = documents.len(),
            referenced = paths.len(),
            warnings = warnings.len(),
            "reference scan finished"
        );

        ReferenceReport {
            paths,
            documents_scanned: documents.len(),
            warnings,
        }
    }

    /// Scan one document; returns warnings for the parts that failed.
    fn scan_document<V>(
        &self,
        vault: &V,
        file: &VaultFile,
        referenced: &DashSet<String>,
    ) -> Vec<ScanWarning>
    where
        V: Vault + ?Sized,
    {
        let mut warnings = Vec::new();
        let mut report = |error: VaultError| {
            tracing::warn!(path = %file.path, %error, "skipping document contents");
            warnings.push(ScanWarning::from_error(&file.path, &error));
        };

        if file.is_note() {
            match vault.read_text(&file.path) {
                Ok(text) => {
                    match vault.frontmatter_in(&file.path, &text) {
                        Ok(Some(frontmatter)) => {
                            self.scan_frontmatter(vault, file, &frontmatter, referenced);
                        }
                        Ok(None) => {}
                        Err(error) => report(error),
                    }
                    self.scan_text(vault, &file.path, &text, referenced);
                }
                Err(error) => report(error),
            }
        } else if let Err(error) = self.scan_canvas(vault, file, referenced) {
            report(error);
        }

        warnings
    }

    fn scan_frontmatter<V>(
        &self,
        vault: &V,
        file: &VaultFile,
        frontmatter: &Frontmatter,
        referenced: &DashSet<String>,
    ) where
        V: Vault + ?Sized,
    {
        let strings = frontmatter.values().flat_map(|value| match value {
            serde_json::Value::String(s) => vec![s.as_str()],
            serde_json::Value::Array(items) => items.iter().filter_map(|i| i.as_str()).collect(),
            _ => Vec::new(),
        });

        for value in strings {
            if let Some(name) = embedded_wiki_target(value) {
                referenced.insert(resolve_link(name, &file.path, vault).path);
            } else if looks_like_image_path(value) {
                referenced.insert(value.trim().to_string());
            }
        }
    }

    fn scan_text<V>(&self, vault: &V, source: &str, text: &str, referenced: &DashSet<String>)
    where
        V: Vault + ?Sized,
    {
        for link in extract_links(text, source) {
            let resolved = resolve_link(link.target, source, vault);
            tracing::trace!(
                source,
                raw = link.raw,
                kind = ?link.kind,
                resolved = %resolved.path,
                "link"
            );
            referenced.insert(resolved.path);
        }
    }

    fn scan_canvas<V>(
        &self,
        vault: &V,
        file: &VaultFile,
        referenced: &DashSet<String>,
    ) -> Result<(), VaultError>
    where
        V: Vault + ?Sized,
    {
        let text = vault.read_text(&file.path)?;
        if text.trim().is_empty() {
            return Ok(());
        }

        let canvas: CanvasDocument =
            serde_json::from_str(&text).map_err(|e| VaultError::InvalidCanvas {
                path: file.path.clone(),
                message: e.to_string(),
            })?;

        for node in &canvas.nodes {
            match (node.kind.as_str(), &node.file, &node.text) {
                ("file", Some(path), _) => {
                    referenced.insert(path.clone());
                }
                ("text", _, Some(text)) => self.scan_text(vault, &file.path, text, referenced),
                _ => {}
            }
        }
        Ok(())
    }
}
