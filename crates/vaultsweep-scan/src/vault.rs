//! Filesystem-backed vault.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use vaultsweep_core::{Frontmatter, ScanWarning, Vault, VaultConfig, VaultError, VaultFile};

use crate::frontmatter::parse_frontmatter;
use crate::linkpath::LinkIndex;
use crate::scanner::VaultScanner;

/// A vault rooted at a directory on disk.
///
/// The file list is captured when the vault is opened and kept current as
/// files are disposed of; call [`refresh`](Self::refresh) to pick up
/// changes made by other programs.
pub struct FsVault {
    root: PathBuf,
    config: VaultConfig,
    index: RwLock<LinkIndex>,
    warnings: Vec<ScanWarning>,
}

impl FsVault {
    /// Open the vault described by `config` and enumerate its files.
    pub fn open(config: &VaultConfig) -> Result<Self, VaultError> {
        let root = config
            .root
            .canonicalize()
            .map_err(|e| VaultError::io(config.root.display().to_string(), e))?;

        if !root.is_dir() {
            return Err(VaultError::NotADirectory { path: root });
        }

        let walk = VaultScanner::new().walk(config, &root);
        tracing::info!(root = %root.display(), files = walk.files.len(), "opened vault");

        Ok(Self {
            index: RwLock::new(LinkIndex::new(walk.files)),
            warnings: walk.warnings,
            config: config.clone(),
            root,
        })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Problems met while enumerating the vault.
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Re-enumerate the vault from disk.
    pub fn refresh(&mut self) {
        let walk = VaultScanner::new().walk(&self.config, &self.root);
        self.warnings = walk.warnings;
        *self.index.get_mut().unwrap_or_else(PoisonError::into_inner) = LinkIndex::new(walk.files);
    }

    fn read_index(&self) -> RwLockReadGuard<'_, LinkIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Absolute path of a known vault file.
    fn absolute(&self, path: &str) -> Result<PathBuf, VaultError> {
        if self.read_index().get(path).is_none() {
            return Err(VaultError::NotFound {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(path))
    }

    /// Drop a disposed file from the cached listing.
    fn forget(&self, path: &str) {
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }

    fn move_to_vault_trash(&self, path: &str, abs: &Path) -> Result<(), VaultError> {
        let trash_dir = self.root.join(self.config.trash_dir.trim_matches('/'));
        fs::create_dir_all(&trash_dir).map_err(|e| VaultError::Trash {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let file = VaultFile::new(path, 0);
        let mut dest = trash_dir.join(file.name.as_str());
        let mut n = 2;
        while dest.exists() {
            let name = if file.extension.is_empty() {
                format!("{} {n}", file.stem())
            } else {
                format!("{} {n}.{}", file.stem(), file.extension)
            };
            dest = trash_dir.join(name);
            n += 1;
        }

        fs::rename(abs, &dest).map_err(|e| VaultError::Trash {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl Vault for FsVault {
    fn files(&self) -> Vec<VaultFile> {
        self.read_index().files().cloned().collect()
    }

    fn read_text(&self, path: &str) -> Result<String, VaultError> {
        let abs = self.absolute(path)?;
        fs::read_to_string(&abs).map_err(|e| VaultError::io(path, e))
    }

    fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>, VaultError> {
        let text = self.read_text(path)?;
        parse_frontmatter(path, &text)
    }

    fn frontmatter_in(&self, path: &str, text: &str) -> Result<Option<Frontmatter>, VaultError> {
        parse_frontmatter(path, text)
    }

    fn first_link_dest(&self, link: &str, source: &str) -> Option<VaultFile> {
        self.read_index().resolve(link, source).cloned()
    }

    fn trash(&self, path: &str, system: bool) -> Result<(), VaultError> {
        let abs = self.absolute(path)?;
        if system {
            trash::delete(&abs).map_err(|e| VaultError::Trash {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        } else {
            self.move_to_vault_trash(path, &abs)?;
        }
        self.forget(path);
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), VaultError> {
        let abs = self.absolute(path)?;
        fs::remove_file(&abs).map_err(|e| VaultError::io(path, e))?;
        self.forget(path);
        Ok(())
    }
}
