//! In-memory vault for tests and embedding hosts.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::error::VaultError;
use crate::file::{DeleteOption, NOTE_EXTENSION, VaultFile};
use crate::vault::{Frontmatter, ResolvedLinks, Vault};

#[derive(Debug, Clone)]
struct Entry {
    file: VaultFile,
    content: Vec<u8>,
    frontmatter: Option<Frontmatter>,
}

#[derive(Debug, Default)]
struct State {
    entries: IndexMap<String, Entry>,
    disposals: Vec<(String, DeleteOption)>,
}

/// A [`Vault`] held entirely in memory.
///
/// Files keep insertion order. Front-matter is supplied explicitly rather
/// than parsed, the way a host's metadata cache would hand it over. Link
/// lookup tries the exact path (with and without `.md`) and then the first
/// file whose name matches the link's last segment.
#[derive(Debug, Default)]
pub struct MemoryVault {
    state: RwLock<State>,
    resolved_links: Option<ResolvedLinks>,
    locked: HashSet<String>,
}

impl MemoryVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    pub fn with_file(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Add a note with a front-matter map and a body.
    pub fn with_note(self, path: impl Into<String>, frontmatter: Frontmatter, body: &str) -> Self {
        let path = path.into();
        self.insert(path.clone(), body);
        self.write_state().entries[&path].frontmatter = Some(frontmatter);
        self
    }

    /// Provide a pre-resolved link index.
    pub fn with_resolved_links(mut self, links: ResolvedLinks) -> Self {
        self.resolved_links = Some(links);
        self
    }

    /// Make every disposal of `path` fail.
    pub fn with_locked(mut self, path: impl Into<String>) -> Self {
        self.locked.insert(path.into());
        self
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        let content = content.into();
        let file = VaultFile::new(path.clone(), content.len() as u64);
        self.write_state().entries.insert(
            path,
            Entry {
                file,
                content,
                frontmatter: None,
            },
        );
    }

    /// Check whether a path is still present.
    pub fn contains(&self, path: &str) -> bool {
        self.read_state().entries.contains_key(path)
    }

    /// Disposals performed so far, in order.
    pub fn disposals(&self) -> Vec<(String, DeleteOption)> {
        self.read_state().disposals.clone()
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, path: &str, action: DeleteOption) -> Result<(), VaultError> {
        if self.locked.contains(path) {
            return Err(VaultError::PermissionDenied {
                path: path.to_string(),
            });
        }
        let mut state = self.write_state();
        if state.entries.shift_remove(path).is_none() {
            return Err(VaultError::NotFound {
                path: path.to_string(),
            });
        }
        state.disposals.push((path.to_string(), action));
        Ok(())
    }
}

impl Vault for MemoryVault {
    fn files(&self) -> Vec<VaultFile> {
        self.read_state()
            .entries
            .values()
            .map(|e| e.file.clone())
            .collect()
    }

    fn read_text(&self, path: &str) -> Result<String, VaultError> {
        let state = self.read_state();
        let entry = state.entries.get(path).ok_or_else(|| VaultError::NotFound {
            path: path.to_string(),
        })?;
        String::from_utf8(entry.content.clone()).map_err(|e| {
            VaultError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>, VaultError> {
        let state = self.read_state();
        let entry = state.entries.get(path).ok_or_else(|| VaultError::NotFound {
            path: path.to_string(),
        })?;
        Ok(entry.frontmatter.clone())
    }

    fn first_link_dest(&self, link: &str, _source: &str) -> Option<VaultFile> {
        let state = self.read_state();
        let with_ext = format!("{link}.{NOTE_EXTENSION}");
        if let Some(entry) = state
            .entries
            .get(link)
            .or_else(|| state.entries.get(&with_ext))
        {
            return Some(entry.file.clone());
        }

        let name = link.rsplit('/').next().unwrap_or(link);
        state
            .entries
            .values()
            .find(|e| e.file.name == name || (e.file.is_note() && e.file.stem() == name))
            .map(|e| e.file.clone())
    }

    fn resolved_links(&self) -> Option<ResolvedLinks> {
        self.resolved_links.clone()
    }

    fn trash(&self, path: &str, system: bool) -> Result<(), VaultError> {
        let action = if system {
            DeleteOption::SystemTrash
        } else {
            DeleteOption::VaultTrash
        };
        self.remove(path, action)
    }

    fn delete(&self, path: &str) -> Result<(), VaultError> {
        self.remove(path, DeleteOption::Permanent)
    }
}
