//! Filesystem vault for vaultsweep.
//!
//! This crate provides [`FsVault`], a [`Vault`](vaultsweep_core::Vault)
//! backed by a directory on disk:
//!
//! - **Parallel enumeration** via jwalk/rayon, dot-folders skipped
//! - **Front-matter** parsed from the leading YAML block of each note
//! - **Link lookup** relative to the linking note, from the vault root,
//!   then by file name
//! - **Disposal** into the vault's `.trash` folder, the system trash, or
//!   permanently
//!
//! # Example
//!
//! ```rust,no_run
//! use vaultsweep_core::Vault;
//! use vaultsweep_scan::{FsVault, VaultConfig};
//!
//! let vault = FsVault::open(&VaultConfig::new("/path/to/vault")).unwrap();
//! println!("{} files", vault.files().len());
//!
//! if let Some(file) = vault.first_link_dest("diagram.png", "notes/idea.md") {
//!     println!("resolves to {}", file.path);
//! }
//! ```

mod frontmatter;
mod linkpath;
mod scanner;
mod vault;

pub use frontmatter::{parse_frontmatter, split_frontmatter};
pub use linkpath::LinkIndex;
pub use scanner::{VaultScanner, WalkResult};
pub use vault::FsVault;

// Re-export core types for convenience
pub use vaultsweep_core::{ScanWarning, VaultConfig, VaultError, VaultFile, WarningKind};
