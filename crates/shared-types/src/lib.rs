//! # Shared Types Crate
//!
//! Domain primitives and capability traits shared by every wallet subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Capabilities over concretions**: the wallet account, features, storages
//!   and the module registry are traits; subsystems never assume a concrete
//!   substrate object.
//! - **One lock, shared**: the per-wallet execution lock lives here so the
//!   version registry and the relay engine exclude each other through the
//!   same `WalletLockSet`.

pub mod capabilities;
pub mod entities;
pub mod value_objects;
pub mod wallet_lock;

pub use capabilities::{
    Feature, FeatureDirectory, FeatureFailure, FeatureResult, ModuleRegistry, SignaturePolicy,
    WalletAccount, WalletDirectory, WalletStorage,
};
pub use entities::{
    InMemoryFeatureDirectory, InMemoryModuleRegistry, InMemoryWalletDirectory, LocalWallet,
};
pub use value_objects::{Address, Bytes, Hash, RelayNonce, Selector, VersionId, NATIVE_TOKEN, U256};
pub use wallet_lock::{LockError, WalletLockGuard, WalletLockSet};
