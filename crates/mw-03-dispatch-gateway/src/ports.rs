//! # Driven Ports (Outbound)
//!
//! Interfaces the dispatch gateway depends on. Adapters over the version
//! registry and the storage authority implement these; tests substitute
//! fixed tables.

use async_trait::async_trait;
use shared_types::{Address, VersionId, WalletStorage};
use std::sync::Arc;

/// Version-membership oracle (fulfilled by the version registry).
#[async_trait]
pub trait VersionMembership: Send + Sync {
    /// Whether `feature` belongs to version `version`.
    ///
    /// Version 0 (uninitialized wallet) contains no features.
    async fn is_feature_in_version(&self, version: VersionId, feature: Address) -> bool;
}

/// Storage-whitelist oracle (fulfilled by the storage authority).
#[async_trait]
pub trait StoragePolicy: Send + Sync {
    /// Whether writes to `storage` are authorized platform-wide.
    async fn is_authorized(&self, storage: Address) -> bool;
}

/// Resolves storage addresses to live storage objects.
pub trait StorageDirectory: Send + Sync {
    /// Looks up a storage; None if the address is not a known storage.
    fn storage(&self, address: Address) -> Option<Arc<dyn WalletStorage>>;
}
