//! # Storage Authority Service
//!
//! Tracks which storages the active features of any wallet may write to.
//! The whitelist is platform-wide (not per-wallet), mutated only by the
//! platform owner, and add-only: once authorized, a storage stays
//! authorized for the lifetime of the deployment.

use crate::errors::StorageAuthorityError;
use shared_bus::{EventPublisher, WalletEvent};
use shared_types::Address;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// The storage whitelist behind every dispatch authorization check.
pub struct StorageAuthorityService {
    /// The platform owner, sole caller allowed to mutate the whitelist.
    platform_owner: Address,
    /// Authorized storage addresses.
    authorized: RwLock<HashSet<Address>>,
    /// Event bus for observable transitions.
    events: Arc<dyn EventPublisher>,
}

impl StorageAuthorityService {
    /// Creates an empty whitelist owned by `platform_owner`.
    pub fn new(platform_owner: Address, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            platform_owner,
            authorized: RwLock::new(HashSet::new()),
            events,
        }
    }

    /// Adds a storage to the whitelist.
    ///
    /// # Errors
    ///
    /// - `NotPlatformOwner` when `caller` is not the platform owner
    /// - `StorageAlreadyAdded` on duplicate add
    #[instrument(skip(self))]
    pub async fn add_storage(
        &self,
        caller: Address,
        storage: Address,
    ) -> Result<(), StorageAuthorityError> {
        if caller != self.platform_owner {
            return Err(StorageAuthorityError::NotPlatformOwner(caller));
        }

        {
            let mut authorized = self.authorized.write().await;
            if !authorized.insert(storage) {
                return Err(StorageAuthorityError::StorageAlreadyAdded(storage));
            }
        }

        info!(storage = ?storage, "Storage authorized");
        self.events.publish(WalletEvent::StorageAdded { storage }).await;
        Ok(())
    }

    /// Whether the storage may be written through the dispatch gateway.
    pub async fn is_authorized(&self, storage: Address) -> bool {
        self.authorized.read().await.contains(&storage)
    }

    /// Snapshot of the whitelist, in no particular order.
    pub async fn authorized_storages(&self) -> Vec<Address> {
        self.authorized.read().await.iter().copied().collect()
    }
}
