//! Core types and traits for vaultsweep.
//!
//! This crate provides the vault file model, the [`Vault`] capability
//! trait the reference engine runs against, an in-memory [`MemoryVault`],
//! and the configuration and error types shared by the other crates.

mod config;
mod error;
mod file;
mod memory;
mod vault;

pub use config::{DisposalConfig, ExclusionConfig, VaultConfig, VaultConfigBuilder};
pub use error::{ScanWarning, VaultError, WarningKind};
pub use file::{
    CANVAS_EXTENSION, DeleteOption, FileKind, MEDIA_EXTENSIONS, NOTE_EXTENSION, ROOT_FOLDER,
    ScanMode, VaultFile, is_media_extension, looks_like_image_path,
};
pub use memory::MemoryVault;
pub use vault::{Frontmatter, ResolvedLinks, Vault};
