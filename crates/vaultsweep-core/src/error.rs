//! Error types for vault access and disposal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a [`Vault`](crate::Vault) implementation.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// File not present in the vault.
    #[error("File not found in vault: {path}")]
    NotFound { path: String },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A canvas file could not be parsed.
    #[error("Invalid canvas {path}: {message}")]
    InvalidCanvas { path: String, message: String },

    /// A note's front-matter block could not be parsed.
    #[error("Invalid front-matter in {path}: {message}")]
    InvalidFrontmatter { path: String, message: String },

    /// Moving a file to a trash location failed.
    #[error("Could not trash {path}: {message}")]
    Trash { path: String, message: String },

    /// Vault root is not a directory.
    #[error("Vault root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl VaultError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Vault path the error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::InvalidCanvas { path, .. }
            | Self::InvalidFrontmatter { path, .. }
            | Self::Trash { path, .. } => Some(path),
            Self::NotADirectory { .. } | Self::InvalidConfig { .. } => None,
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Document text could not be read.
    ReadError,
    /// Front-matter block is malformed.
    InvalidFrontmatter,
    /// Canvas JSON is malformed.
    InvalidCanvas,
    /// Error reported while walking the vault directory.
    WalkError,
}

/// Non-fatal problem with a single document; the scan carries on without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Vault path where the warning occurred.
    pub path: String,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Build a warning from a vault error raised while reading `path`.
    pub fn from_error(path: impl Into<String>, error: &VaultError) -> Self {
        let kind = match error {
            VaultError::InvalidCanvas { .. } => WarningKind::InvalidCanvas,
            VaultError::InvalidFrontmatter { .. } => WarningKind::InvalidFrontmatter,
            _ => WarningKind::ReadError,
        };
        Self {
            path: path.into(),
            message: error.to_string(),
            kind,
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
