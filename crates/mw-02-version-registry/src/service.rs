//! # Version Registry Service
//!
//! Owns the catalogue of published feature bundles, the minimum-version
//! watermark, and the upgrade path that moves a wallet from one bundle to
//! the next.
//!
//! Versions are append-only and immutable: behavior changes always ship as a
//! new version, never as an edit to a published one. A wallet mid-upgrade or
//! deliberately staying behind therefore always resolves to a well-defined,
//! previously published bundle.

use crate::domain::Version;
use crate::errors::VersionError;
use shared_bus::{EventPublisher, WalletEvent};
use shared_types::{
    Address, FeatureDirectory, ModuleRegistry, VersionId, WalletDirectory, WalletLockSet,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Mutable registry state, guarded by one lock.
struct RegistryState {
    /// Published versions; `versions[i]` has id `i + 1`.
    versions: Vec<Version>,
    /// Upgrades below this version id are rejected.
    min_version: VersionId,
}

/// The version catalogue and upgrade engine.
pub struct VersionRegistryService {
    /// The platform owner, sole caller allowed to publish versions.
    platform_owner: Address,
    /// Catalogue of globally vetted module addresses.
    modules: Arc<dyn ModuleRegistry>,
    /// Resolves wallet addresses to account objects.
    wallets: Arc<dyn WalletDirectory>,
    /// Resolves feature addresses to capability objects.
    features: Arc<dyn FeatureDirectory>,
    /// Per-wallet execution lock, shared with the relay engine.
    locks: WalletLockSet,
    /// Event bus for observable transitions.
    events: Arc<dyn EventPublisher>,
    /// Versions and watermark.
    state: RwLock<RegistryState>,
}

impl VersionRegistryService {
    /// Creates an empty registry.
    pub fn new(
        platform_owner: Address,
        modules: Arc<dyn ModuleRegistry>,
        wallets: Arc<dyn WalletDirectory>,
        features: Arc<dyn FeatureDirectory>,
        locks: WalletLockSet,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            platform_owner,
            modules,
            wallets,
            features,
            locks,
            events,
            state: RwLock::new(RegistryState {
                versions: Vec::new(),
                min_version: 1,
            }),
        }
    }

    // =========================================================================
    // PLATFORM OWNER OPERATIONS
    // =========================================================================

    /// Publishes a new version from an ordered feature bundle.
    ///
    /// `features_to_init` marks the subset whose init hook must run against
    /// each wallet as it upgrades in; the hooks are lazy, nothing runs at
    /// publication time.
    ///
    /// # Errors
    ///
    /// - `NotPlatformOwner` when `caller` is not the platform owner
    /// - `EmptyFeatureSet` / `DuplicateFeature` on a malformed bundle
    /// - `UnregisteredModule` when a feature is not vetted
    /// - `InvalidInitSet` when an init entry is missing from the bundle
    #[instrument(skip(self, features, features_to_init))]
    pub async fn add_version(
        &self,
        caller: Address,
        features: Vec<Address>,
        features_to_init: Vec<Address>,
    ) -> Result<VersionId, VersionError> {
        if caller != self.platform_owner {
            return Err(VersionError::NotPlatformOwner(caller));
        }
        if features.is_empty() {
            return Err(VersionError::EmptyFeatureSet);
        }

        let mut seen = HashSet::new();
        for feature in &features {
            if !seen.insert(*feature) {
                return Err(VersionError::DuplicateFeature(*feature));
            }
            if !self.modules.is_registered_module(*feature) {
                return Err(VersionError::UnregisteredModule(*feature));
            }
        }
        for feature in &features_to_init {
            if !seen.contains(feature) {
                return Err(VersionError::InvalidInitSet(*feature));
            }
        }

        let (version_id, fingerprint) = {
            let mut state = self.state.write().await;
            let version_id = state.versions.len() as VersionId + 1;
            let version = Version::new(version_id, features.clone(), features_to_init);
            let fingerprint = version.fingerprint;
            state.versions.push(version);
            (version_id, fingerprint)
        };

        info!(version_id, count = features.len(), "Version published");
        self.events
            .publish(WalletEvent::VersionAdded {
                version_id,
                features,
                fingerprint,
            })
            .await;

        Ok(version_id)
    }

    /// Raises the minimum upgradeable version.
    ///
    /// The watermark never decreases and never exceeds the latest published
    /// version. Wallets already below it keep functioning; only the upgrade
    /// path is gated.
    ///
    /// # Errors
    ///
    /// - `NotPlatformOwner` when `caller` is not the platform owner
    /// - `InvalidMinVersion` when `v` is zero, above the latest version, or
    ///   below the current watermark
    #[instrument(skip(self))]
    pub async fn set_min_version(
        &self,
        caller: Address,
        v: VersionId,
    ) -> Result<(), VersionError> {
        if caller != self.platform_owner {
            return Err(VersionError::NotPlatformOwner(caller));
        }

        {
            let mut state = self.state.write().await;
            let last = state.versions.len() as VersionId;
            if v == 0 || v > last || v < state.min_version {
                return Err(VersionError::InvalidMinVersion(v));
            }
            state.min_version = v;
        }

        info!(min_version = v, "Minimum version raised");
        self.events
            .publish(WalletEvent::MinVersionChanged { min_version: v })
            .await;
        Ok(())
    }

    // =========================================================================
    // WALLET UPGRADES
    // =========================================================================

    /// Moves a wallet to a published version.
    ///
    /// Callable only by the wallet owner, directly or through the relay
    /// engine once it has authenticated the owner's signature. Runs the
    /// target version's init hooks, replaces the wallet-level module ACL,
    /// then advances the version pointer; a failing hook aborts the upgrade
    /// with no state change.
    ///
    /// # Errors
    ///
    /// - `UnknownWallet` / `NotWalletOwner` / `WalletLocked` on a bad caller
    ///   or wallet state
    /// - `AlreadyCurrent` / `BelowMinVersion` / `UnknownVersion` on a bad
    ///   target
    /// - `Reentrancy` when the wallet is mid-call
    /// - `FeatureUnavailable` / `InitHookFailed` from the init pass
    #[instrument(skip(self))]
    pub async fn upgrade_wallet(
        &self,
        caller: Address,
        wallet: Address,
        to_version: VersionId,
    ) -> Result<(), VersionError> {
        let account = self
            .wallets
            .wallet(wallet)
            .ok_or(VersionError::UnknownWallet(wallet))?;

        if caller != account.owner() {
            return Err(VersionError::NotWalletOwner { caller, wallet });
        }
        if account.is_locked() {
            return Err(VersionError::WalletLocked(wallet));
        }

        let target = {
            let state = self.state.read().await;
            if to_version == account.current_version() {
                return Err(VersionError::AlreadyCurrent(to_version));
            }
            if to_version < state.min_version {
                return Err(VersionError::BelowMinVersion {
                    requested: to_version,
                    min: state.min_version,
                });
            }
            let index = to_version
                .checked_sub(1)
                .and_then(|i| usize::try_from(i).ok());
            index
                .and_then(|i| state.versions.get(i))
                .cloned()
                .ok_or(VersionError::UnknownVersion(to_version))?
        };

        // One top-level call per wallet; released by guard drop on every path.
        let guard = self.locks.acquire(wallet)?;

        for feature_addr in &target.features_to_init {
            let feature = self
                .features
                .feature(*feature_addr)
                .ok_or(VersionError::FeatureUnavailable(*feature_addr))?;
            if let Err(failure) = feature.init(account.clone()).await {
                warn!(feature = ?feature_addr, %failure, "Init hook failed, upgrade aborted");
                return Err(VersionError::InitHookFailed {
                    feature: *feature_addr,
                    reason: failure.to_string(),
                });
            }
        }

        account.authorize_modules(&target.features);
        account.set_current_version(to_version);
        drop(guard);

        info!(wallet = ?wallet, version_id = to_version, "Wallet upgraded");
        self.events
            .publish(WalletEvent::WalletUpgraded {
                wallet,
                version_id: to_version,
            })
            .await;
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Id of the latest published version, 0 when none exist.
    pub async fn last_version(&self) -> VersionId {
        self.state.read().await.versions.len() as VersionId
    }

    /// Current minimum upgradeable version.
    pub async fn min_version(&self) -> VersionId {
        self.state.read().await.min_version
    }

    /// Snapshot of a published version.
    pub async fn version(&self, id: VersionId) -> Option<Version> {
        let state = self.state.read().await;
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        state.versions.get(index).cloned()
    }

    /// Whether `feature` belongs to version `id`. Version 0 has no features.
    pub async fn is_feature_in_version(&self, id: VersionId, feature: Address) -> bool {
        match self.version(id).await {
            Some(version) => version.contains(feature),
            None => false,
        }
    }
}
