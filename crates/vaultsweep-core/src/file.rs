//! Vault file model.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Extension of markdown notes.
pub const NOTE_EXTENSION: &str = "md";

/// Extension of canvas (graph) documents.
pub const CANVAS_EXTENSION: &str = "canvas";

/// Extensions treated as images, compared case-insensitively.
pub const MEDIA_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "svg", "bmp", "webp"];

/// Path of the vault root folder.
pub const ROOT_FOLDER: &str = "/";

/// Check whether an extension (without the dot) is a recognized image type.
pub fn is_media_extension(extension: &str) -> bool {
    MEDIA_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Check whether a string ends in `.<media extension>`, ignoring case.
pub fn looks_like_image_path(value: &str) -> bool {
    value
        .trim()
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && is_media_extension(ext))
}

/// Classification of a vault file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    /// Markdown note (`.md`).
    Note,
    /// Canvas document (`.canvas`).
    Canvas,
    /// Anything else.
    Attachment,
}

impl FileKind {
    /// Classify a file by its extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            NOTE_EXTENSION => Self::Note,
            CANVAS_EXTENSION => Self::Canvas,
            _ => Self::Attachment,
        }
    }
}

/// Which attachments a sweep considers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanMode {
    /// Only files with a recognized image extension.
    #[default]
    Image,
    /// Every file that is neither a note nor a canvas.
    All,
}

impl ScanMode {
    /// Noun used in user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::All => "attachments",
        }
    }
}

/// How unused files are removed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum DeleteOption {
    /// Irreversible delete.
    #[serde(rename = "permanent")]
    #[strum(serialize = "permanent")]
    Permanent,
    /// Move into the vault's own trash folder.
    #[default]
    #[serde(rename = ".trash")]
    #[strum(serialize = ".trash")]
    VaultTrash,
    /// Move to the operating system trash.
    #[serde(rename = "system-trash")]
    #[strum(serialize = "system-trash")]
    SystemTrash,
}

impl DeleteOption {
    /// Whether files can be restored after disposal.
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

/// A file in the vault, addressed by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultFile {
    /// Vault-relative path using `/` separators.
    pub path: String,
    /// File name including extension.
    pub name: CompactString,
    /// Extension without the dot, as found on disk.
    pub extension: CompactString,
    /// Path of the containing folder; `/` for the vault root.
    pub parent: String,
    /// Size in bytes.
    pub size: u64,
}

impl VaultFile {
    /// Build a file entry from a vault-relative path.
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        let path: String = path.into();
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) if !parent.is_empty() => (parent.to_string(), name),
            Some((_, name)) => (ROOT_FOLDER.to_string(), name),
            None => (ROOT_FOLDER.to_string(), path.as_str()),
        };
        let extension = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext,
            _ => "",
        };

        Self {
            name: CompactString::new(name),
            extension: CompactString::new(extension),
            parent,
            path,
            size,
        }
    }

    /// Classify this file.
    pub fn kind(&self) -> FileKind {
        FileKind::from_extension(&self.extension)
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        if self.extension.is_empty() {
            self.name.as_str()
        } else {
            &self.name.as_str()[..self.name.len() - self.extension.len() - 1]
        }
    }

    /// Check if this is a markdown note.
    pub fn is_note(&self) -> bool {
        self.kind() == FileKind::Note
    }

    /// Check if this is a canvas document.
    pub fn is_canvas(&self) -> bool {
        self.kind() == FileKind::Canvas
    }

    /// Check if this file is an image.
    pub fn is_media(&self) -> bool {
        is_media_extension(&self.extension)
    }

    /// Whether a sweep in `mode` treats this file as a candidate attachment.
    pub fn is_attachment_for(&self, mode: ScanMode) -> bool {
        match self.kind() {
            FileKind::Note | FileKind::Canvas => false,
            FileKind::Attachment => self.is_media() || mode == ScanMode::All,
        }
    }
}
