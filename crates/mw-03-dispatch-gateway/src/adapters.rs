//! # Adapters
//!
//! Bridges from the gateway's outbound ports to the subsystems that fulfil
//! them, plus an in-memory storage directory for local wiring.

use crate::ports::{StorageDirectory, StoragePolicy, VersionMembership};
use async_trait::async_trait;
use mw_01_storage_authority::StorageAuthorityService;
use mw_02_version_registry::VersionRegistryService;
use shared_types::{Address, VersionId, WalletStorage};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// =============================================================================
// REGISTRY-BACKED MEMBERSHIP
// =============================================================================

/// Version membership answered by the live version registry.
pub struct RegistryVersionMembership {
    registry: Arc<VersionRegistryService>,
}

impl RegistryVersionMembership {
    /// Wraps a registry service.
    #[must_use]
    pub fn new(registry: Arc<VersionRegistryService>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl VersionMembership for RegistryVersionMembership {
    async fn is_feature_in_version(&self, version: VersionId, feature: Address) -> bool {
        self.registry.is_feature_in_version(version, feature).await
    }
}

// =============================================================================
// AUTHORITY-BACKED STORAGE POLICY
// =============================================================================

/// Storage policy answered by the live storage authority.
pub struct AuthorityStoragePolicy {
    authority: Arc<StorageAuthorityService>,
}

impl AuthorityStoragePolicy {
    /// Wraps a storage authority service.
    #[must_use]
    pub fn new(authority: Arc<StorageAuthorityService>) -> Self {
        Self { authority }
    }
}

#[async_trait]
impl StoragePolicy for AuthorityStoragePolicy {
    async fn is_authorized(&self, storage: Address) -> bool {
        self.authority.is_authorized(storage).await
    }
}

// =============================================================================
// IN-MEMORY STORAGE DIRECTORY
// =============================================================================

/// Storage directory backed by a map.
#[derive(Default)]
pub struct InMemoryStorageDirectory {
    storages: RwLock<HashMap<Address, Arc<dyn WalletStorage>>>,
}

impl InMemoryStorageDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a storage under its own address.
    pub fn insert(&self, storage: Arc<dyn WalletStorage>) {
        self.storages
            .write()
            .unwrap()
            .insert(storage.address(), storage);
    }
}

impl StorageDirectory for InMemoryStorageDirectory {
    fn storage(&self, address: Address) -> Option<Arc<dyn WalletStorage>> {
        self.storages.read().unwrap().get(&address).cloned()
    }
}
