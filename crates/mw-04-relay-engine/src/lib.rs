//! # MW-04 Relay Engine - Signature-Authorized Meta-Transactions
//!
//! ## Purpose
//!
//! Lets an unrelated relayer submit a call the wallet owner (and, for
//! sensitive methods, guardians) authorized off-chain by signature. The
//! engine authenticates the signer set, enforces strict per-wallet nonce
//! ordering, executes through the dispatch gateway, and reimburses the
//! relayer's gas cost from the wallet.
//!
//! ## State Machine
//!
//! ```text
//! Idle -> Verifying -> Executing -> Refunding -> Idle
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | A signed message executes at most once | nonce consumed before execution (`service.rs`) |
//! | Inner feature failure never unwinds the relay | recovered into `success = false` receipts |
//! | Any abort leaves no state change | nonce restore on every error path |
//! | No nested calls per wallet | shared `WalletLockSet` guard |
//! | Relayer tampering is detected | digest recomputed from submitted parameters |
//!
//! ## Outbound Dependencies
//!
//! | Subsystem | Trait | Purpose |
//! |-----------|-------|---------|
//! | 3 (Dispatch Gateway) | `FeatureInvoker` | authorized execution |
//! | 5 (Sig Verification) | direct calls | digest hashing, signer recovery |
//! | external | `GuardianSource` | guardian membership |
//! | external | `BalanceLedger` | refund transfers |

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod errors;
pub mod message;
pub mod nonce;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryGuardians, InMemoryLedger};
pub use errors::RelayError;
pub use message::RelayRequest;
pub use nonce::{NonceLedger, NonceReplayError};
pub use ports::{BalanceLedger, FeatureInvoker, GuardianSource, LedgerError};
pub use service::{RelayEngineConfig, RelayEngineService, RelayEngineStats, RelayReceipt};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 4;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Relay Engine";
