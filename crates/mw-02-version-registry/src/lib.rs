//! # MW-02 Version Registry - Feature Bundles & Wallet Upgrades
//!
//! ## Purpose
//!
//! A wallet's behavior is the set of features its current version bundles.
//! This subsystem owns the append-only catalogue of those bundles, enforces
//! the minimum-version watermark, and performs live wallet upgrades with no
//! downtime and no half-upgraded states.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Published versions are immutable | `service.rs` - versions are only ever appended |
//! | A wallet's version is 0 or a published id >= the watermark at upgrade time | `upgrade_wallet` precondition checks |
//! | Init hooks run before the version pointer moves | `upgrade_wallet` ordering |
//! | The watermark never decreases | `set_min_version` |
//! | One top-level call per wallet | shared `WalletLockSet` guard |
//!
//! ## Usage Example
//!
//! ```ignore
//! let id = registry.add_version(owner, features, features_to_init).await?;
//! registry.upgrade_wallet(wallet_owner, wallet, id).await?;
//! assert_eq!(registry.last_version().await, id);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::{fingerprint, Version};
pub use errors::VersionError;
pub use service::VersionRegistryService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 2;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Version Registry";
