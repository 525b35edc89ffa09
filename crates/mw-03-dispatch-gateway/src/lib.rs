//! # MW-03 Dispatch Gateway - Per-Call Authorization
//!
//! ## Purpose
//!
//! Every feature invocation against a wallet passes through this gate:
//! the calling feature must belong to the wallet's current version, and any
//! storage it touches must be on the platform whitelist. This single choke
//! point is what makes upgrades safe - dropping a feature from the next
//! version revokes its in-flight authority the moment a wallet upgrades.
//!
//! ## Outbound Dependencies
//!
//! | Subsystem | Trait | Purpose |
//! |-----------|-------|---------|
//! | 2 (Version Registry) | `VersionMembership` | feature-in-version checks |
//! | 1 (Storage Authority) | `StoragePolicy` | storage whitelist checks |

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod service;

pub use adapters::{AuthorityStoragePolicy, InMemoryStorageDirectory, RegistryVersionMembership};
pub use errors::GatewayError;
pub use ports::{StorageDirectory, StoragePolicy, VersionMembership};
pub use service::DispatchGatewayService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 3;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Dispatch Gateway";
