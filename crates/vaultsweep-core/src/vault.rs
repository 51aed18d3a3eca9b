//! The store capability set the engine runs against.

use std::collections::HashMap;

use crate::error::VaultError;
use crate::file::VaultFile;

/// Parsed front-matter of a note, keyed by field name.
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

/// Pre-resolved link index: source note path -> (target path -> link count).
pub type ResolvedLinks = HashMap<String, HashMap<String, usize>>;

/// A hierarchical document store holding notes, canvases and attachments.
///
/// Implementations own the files; the engine only reads through this trait,
/// except for the three disposal methods used by the remover.
pub trait Vault: Send + Sync {
    /// Every file in the vault, in a stable enumeration order.
    fn files(&self) -> Vec<VaultFile>;

    /// Read a file as UTF-8 text.
    fn read_text(&self, path: &str) -> Result<String, VaultError>;

    /// Front-matter of a note, or `None` if the note has no front-matter block.
    fn frontmatter(&self, path: &str) -> Result<Option<Frontmatter>, VaultError>;

    /// Front-matter of a note whose `text` the caller has already read.
    ///
    /// Stores that parse front-matter out of the note text override this to
    /// avoid reading the note twice.
    fn frontmatter_in(&self, path: &str, _text: &str) -> Result<Option<Frontmatter>, VaultError> {
        self.frontmatter(path)
    }

    /// Best match for `link` as written inside the note at `source`.
    fn first_link_dest(&self, link: &str, source: &str) -> Option<VaultFile>;

    /// Already-resolved links, when the store keeps such an index.
    fn resolved_links(&self) -> Option<ResolvedLinks> {
        None
    }

    /// Move a file to the vault trash, or to the system trash when `system` is set.
    fn trash(&self, path: &str, system: bool) -> Result<(), VaultError>;

    /// Delete a file permanently.
    fn delete(&self, path: &str) -> Result<(), VaultError>;
}
