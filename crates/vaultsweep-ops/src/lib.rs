//! Disposal engine for vaultsweep.
//!
//! This crate removes unused files found by `vaultsweep-analyze`, honouring
//! folder exclusions and the configured [`DeleteOption`], and produces the
//! cleanup log. Disposal runs either synchronously ([`dispose`],
//! [`scan_and_dispose`]) or on the tokio runtime with progress reported via
//! a channel ([`start_disposal`]).
//!
//! ```rust,ignore
//! use vaultsweep_core::{DisposalConfig, ScanMode, VaultConfig};
//! use vaultsweep_ops::scan_and_dispose;
//! use vaultsweep_scan::FsVault;
//!
//! let vault = FsVault::open(&VaultConfig::new("/path/to/vault")).unwrap();
//! let outcome = scan_and_dispose(&vault, ScanMode::Image, &DisposalConfig::default());
//! println!("{}", outcome.summary());
//! ```

mod disposal;
mod progress;
mod sweep;

pub use disposal::{
    DisposalError, DisposalReport, LogEntry, LogLevel, dispose, start_disposal,
};
pub use progress::{DisposalEvent, DisposalProgress};
pub use sweep::{
    LOG_TIMESTAMP_FORMAT, PendingSweep, SweepOutcome, SweepReport, scan_and_dispose,
};

pub use vaultsweep_core::{DeleteOption, DisposalConfig, ExclusionConfig};

/// Default channel buffer size for disposal progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
