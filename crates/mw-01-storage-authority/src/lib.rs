//! # MW-01 Storage Authority - Storage Write Whitelist
//!
//! ## Purpose
//!
//! Features persist their state (guardian lists, transfer limits, oracle
//! data) in dedicated storage contracts. This subsystem holds the
//! platform-wide whitelist of storages those features may write to; the
//! dispatch gateway consults it before every storage write.
//!
//! The whitelist is add-only by design: revoking a storage would strand the
//! state of every wallet whose features persist there.

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod errors;
pub mod service;

pub use errors::StorageAuthorityError;
pub use service::StorageAuthorityService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 1;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Storage Authority";
