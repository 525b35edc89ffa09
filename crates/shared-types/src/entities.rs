//! # Reference Entities
//!
//! In-memory implementations of the capability traits. The production
//! substrate supplies its own; these back local wiring and the test suites.

use crate::capabilities::{
    Feature, FeatureDirectory, ModuleRegistry, WalletAccount, WalletDirectory,
};
use crate::value_objects::{Address, VersionId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

// =============================================================================
// LOCAL WALLET
// =============================================================================

/// Mutable wallet state behind the account interface.
#[derive(Debug, Default)]
struct LocalWalletState {
    locked: bool,
    current_version: VersionId,
    authorized_modules: Vec<Address>,
}

/// An in-process wallet account.
pub struct LocalWallet {
    address: Address,
    owner: Address,
    state: RwLock<LocalWalletState>,
}

impl LocalWallet {
    /// Creates an unlocked wallet on version 0.
    #[must_use]
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            state: RwLock::new(LocalWalletState::default()),
        }
    }

    /// Locks or unlocks the wallet.
    pub fn set_locked(&self, locked: bool) {
        self.state.write().unwrap().locked = locked;
    }
}

impl WalletAccount for LocalWallet {
    fn address(&self) -> Address {
        self.address
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn is_locked(&self) -> bool {
        self.state.read().unwrap().locked
    }

    fn current_version(&self) -> VersionId {
        self.state.read().unwrap().current_version
    }

    fn set_current_version(&self, version: VersionId) {
        self.state.write().unwrap().current_version = version;
    }

    fn authorize_modules(&self, modules: &[Address]) {
        self.state.write().unwrap().authorized_modules = modules.to_vec();
    }

    fn authorized_modules(&self) -> Vec<Address> {
        self.state.read().unwrap().authorized_modules.clone()
    }
}

// =============================================================================
// DIRECTORIES
// =============================================================================

/// Wallet directory backed by a map.
#[derive(Default)]
pub struct InMemoryWalletDirectory {
    wallets: RwLock<HashMap<Address, Arc<dyn WalletAccount>>>,
}

impl InMemoryWalletDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wallet under its own address.
    pub fn insert(&self, wallet: Arc<dyn WalletAccount>) {
        self.wallets.write().unwrap().insert(wallet.address(), wallet);
    }
}

impl WalletDirectory for InMemoryWalletDirectory {
    fn wallet(&self, address: Address) -> Option<Arc<dyn WalletAccount>> {
        self.wallets.read().unwrap().get(&address).cloned()
    }
}

/// Feature directory backed by a map.
#[derive(Default)]
pub struct InMemoryFeatureDirectory {
    features: RwLock<HashMap<Address, Arc<dyn Feature>>>,
}

impl InMemoryFeatureDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feature under its own address.
    pub fn insert(&self, feature: Arc<dyn Feature>) {
        self.features
            .write()
            .unwrap()
            .insert(feature.address(), feature);
    }
}

impl FeatureDirectory for InMemoryFeatureDirectory {
    fn feature(&self, address: Address) -> Option<Arc<dyn Feature>> {
        self.features.read().unwrap().get(&address).cloned()
    }
}

// =============================================================================
// MODULE REGISTRY
// =============================================================================

/// Module registry backed by a set.
#[derive(Default)]
pub struct InMemoryModuleRegistry {
    modules: RwLock<HashSet<Address>>,
}

impl InMemoryModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Vets a module address.
    pub fn register(&self, module: Address) {
        self.modules.write().unwrap().insert(module);
    }
}

impl ModuleRegistry for InMemoryModuleRegistry {
    fn is_registered_module(&self, module: Address) -> bool {
        self.modules.read().unwrap().contains(&module)
    }
}

// =============================================================================
// TESTS
// =============================================================================
