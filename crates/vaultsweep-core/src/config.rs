//! Vault and sweep configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::file::{DeleteOption, ROOT_FOLDER, VaultFile};

/// Configuration for opening a filesystem vault.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct VaultConfig {
    /// Root directory of the vault.
    pub root: PathBuf,

    /// Include dot-files and dot-folders (`.obsidian`, `.trash`, ...).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Number of threads for walking (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Folder inside the vault that receives vault-trashed files.
    #[builder(default = "default_trash_dir()")]
    #[serde(default = "default_trash_dir")]
    pub trash_dir: String,
}

fn default_trash_dir() -> String {
    ".trash".to_string()
}

impl VaultConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Vault root cannot be empty".to_string());
            }
        } else {
            return Err("Vault root is required".to_string());
        }
        if let Some(ref trash_dir) = self.trash_dir {
            if trash_dir.trim_matches('/').is_empty() {
                return Err("Trash folder cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl VaultConfig {
    /// Create a new config builder.
    pub fn builder() -> VaultConfigBuilder {
        VaultConfigBuilder::default()
    }

    /// Create a simple config for a vault root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_hidden: false,
            follow_symlinks: false,
            threads: 0,
            trash_dir: default_trash_dir(),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Folders whose files are never disposed of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionConfig {
    /// Vault-relative folder paths, normalised without surrounding `/`.
    pub excluded_folders: Vec<String>,
    /// Also exclude every folder below an excluded folder.
    pub include_subfolders: bool,
}

impl ExclusionConfig {
    /// Build from a list of folder paths.
    pub fn new<I, S>(folders: I, include_subfolders: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut excluded_folders: Vec<String> = Vec::new();
        for folder in folders {
            let Some(folder) = normalize_folder(folder.as_ref()) else {
                continue;
            };
            if !excluded_folders.contains(&folder) {
                excluded_folders.push(folder);
            }
        }
        Self {
            excluded_folders,
            include_subfolders,
        }
    }

    /// Parse the comma-separated settings string (`"Archive, Daily/2023"`).
    pub fn from_setting(setting: &str, include_subfolders: bool) -> Self {
        Self::new(setting.split(','), include_subfolders)
    }

    /// Check if no folder is excluded.
    pub fn is_empty(&self) -> bool {
        self.excluded_folders.is_empty()
    }

    /// Whether `file` sits in an excluded folder.
    ///
    /// Without subfolders the parent must equal an excluded path. With
    /// subfolders the parent may also lie below it, matched on whole path
    /// segments so that `A/B` never covers `A/Bx`.
    pub fn is_excluded(&self, file: &VaultFile) -> bool {
        self.is_folder_excluded(&file.parent)
    }

    /// Folder-level variant of [`is_excluded`](Self::is_excluded).
    pub fn is_folder_excluded(&self, folder: &str) -> bool {
        let folder = if folder == ROOT_FOLDER {
            ROOT_FOLDER
        } else {
            folder.trim_matches('/')
        };

        self.excluded_folders.iter().any(|excluded| {
            if excluded == folder {
                return true;
            }
            if !self.include_subfolders {
                return false;
            }
            if excluded == ROOT_FOLDER {
                return true;
            }
            folder
                .strip_prefix(excluded.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Normalise a configured folder path; `None` for blank entries.
fn normalize_folder(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let inner = trimmed.trim_matches('/');
    if inner.is_empty() {
        Some(ROOT_FOLDER.to_string())
    } else {
        Some(inner.to_string())
    }
}

/// Everything the remover needs for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposalConfig {
    /// How files are removed.
    pub delete_option: DeleteOption,
    /// Folders to leave alone.
    pub exclusion: ExclusionConfig,
}

impl DisposalConfig {
    /// Create a disposal config.
    pub fn new(delete_option: DeleteOption, exclusion: ExclusionConfig) -> Self {
        Self {
            delete_option,
            exclusion,
        }
    }
}
