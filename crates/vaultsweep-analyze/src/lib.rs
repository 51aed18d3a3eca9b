//! Reference resolution engine for vaultsweep.
//!
//! This crate works out which attachments in a vault are still referenced:
//!
//! - **Link extraction** - Find wiki (`[[...]]`) and markdown (`[...](...)`)
//!   links, with or without a `#` transclusion fragment
//! - **Link resolution** - Map each link target to a vault path through the
//!   [`Vault`] lookup, keeping the raw target when nothing matches
//! - **Reference collection** - Union the links from every note body,
//!   front-matter field and canvas node with the vault's own link index
//! - **Unused detection** - Subtract the referenced set from the vault's
//!   attachments
//!
//! ```rust,ignore
//! use vaultsweep_analyze::UnusedFinder;
//! use vaultsweep_core::{ScanMode, VaultConfig};
//! use vaultsweep_scan::FsVault;
//!
//! let vault = FsVault::open(&VaultConfig::new("/path/to/vault")).unwrap();
//! let report = UnusedFinder::new().find_unused(&vault, ScanMode::Image);
//!
//! for file in &report.unused {
//!     println!("{}", file.path);
//! }
//! ```

pub mod links;
mod references;
mod resolve;
mod unused;

pub use links::{LinkKind, LinkOccurrence, embedded_wiki_target, extract_links, is_external};
pub use references::{
    ReferenceCollector, ReferenceConfig, ReferenceConfigBuilder, ReferenceReport,
    ReferencedPathSet,
};
pub use resolve::{ResolvedReference, resolve_link};
pub use unused::{UnusedFinder, UnusedReport, attachments_in_vault};

// Re-export core types
pub use vaultsweep_core::{ScanMode, ScanWarning, Vault, VaultFile};
