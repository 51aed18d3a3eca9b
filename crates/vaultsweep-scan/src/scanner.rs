//! JWalk-based parallel vault enumeration.

use std::path::{Component, Path};
use std::time::Duration;

use itertools::Itertools;
use jwalk::{Parallelism, WalkDir};

use vaultsweep_core::{ScanWarning, VaultConfig, VaultFile, WarningKind};

/// Files found by a walk plus the problems met along the way.
#[derive(Debug, Default)]
pub struct WalkResult {
    /// Files sorted by vault path.
    pub files: Vec<VaultFile>,
    /// Entries that could not be read.
    pub warnings: Vec<ScanWarning>,
}

/// Enumerates the files of a vault directory using jwalk.
#[derive(Debug, Default)]
pub struct VaultScanner;

impl VaultScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Walk `root` and collect every regular file as a [`VaultFile`].
    ///
    /// The trash folder is never part of the result, even when hidden
    /// entries are included.
    pub fn walk(&self, config: &VaultConfig, root: &Path) -> WalkResult {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let walker = WalkDir::new(root)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .sort(true);

        let trash_dir = config.trash_dir.trim_matches('/');
        let mut result = WalkResult::default();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err
                        .path()
                        .and_then(|p| relative_vault_path(root, p))
                        .unwrap_or_default();
                    result
                        .warnings
                        .push(ScanWarning::new(path, err.to_string(), WarningKind::WalkError));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let abs = entry.path();
            let Some(rel) = relative_vault_path(root, &abs) else {
                continue;
            };
            if rel == trash_dir || rel.starts_with(&format!("{trash_dir}/")) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(err) => {
                    result
                        .warnings
                        .push(ScanWarning::new(&rel, err.to_string(), WarningKind::WalkError));
                    0
                }
            };

            result.files.push(VaultFile::new(rel, size));
        }

        result.files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(
            files = result.files.len(),
            warnings = result.warnings.len(),
            root = %root.display(),
            "vault walk finished"
        );
        result
    }
}

/// Convert an absolute path below `root` into a `/`-separated vault path.
pub(crate) fn relative_vault_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_vault() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("notes")).unwrap();
        fs::create_dir_all(root.join("assets/img")).unwrap();
        fs::create_dir_all(root.join(".obsidian")).unwrap();
        fs::create_dir_all(root.join(".trash")).unwrap();

        fs::write(root.join("notes/a.md"), "![[one.png]]").unwrap();
        fs::write(root.join("assets/img/one.png"), "png").unwrap();
        fs::write(root.join("board.canvas"), "{}").unwrap();
        fs::write(root.join(".obsidian/app.json"), "{}").unwrap();
        fs::write(root.join(".trash/old.png"), "png").unwrap();

        temp
    }

    #[test]
    fn test_walk_skips_hidden_and_trash() {
        let temp = create_test_vault();
        let config = VaultConfig::new(temp.path());
        let result = VaultScanner::new().walk(&config, temp.path());

        let paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["assets/img/one.png", "board.canvas", "notes/a.md"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_walk_includes_hidden_but_not_trash() {
        let temp = create_test_vault();
        let config = VaultConfig::builder()
            .root(temp.path())
            .include_hidden(true)
            .build()
            .unwrap();
        let result = VaultScanner::new().walk(&config, temp.path());

        assert!(result.files.iter().any(|f| f.path == ".obsidian/app.json"));
        assert!(!result.files.iter().any(|f| f.path.starts_with(".trash")));
    }

    #[test]
    fn test_relative_vault_path() {
        let root = Path::new("/vault");
        assert_eq!(
            relative_vault_path(root, Path::new("/vault/a/b.png")).as_deref(),
            Some("a/b.png")
        );
        assert_eq!(relative_vault_path(root, Path::new("/vault")), None);
        assert_eq!(relative_vault_path(root, Path::new("/elsewhere/x")), None);
    }
}
