//! # Dispatch Gateway Service
//!
//! The single choke point every feature invocation passes through. A feature
//! acts on a wallet only while it belongs to the wallet's current version,
//! and touches a storage only while that storage is whitelisted. Removing a
//! feature from a future version therefore revokes its authority the instant
//! a wallet upgrades, with no separate revocation step.

use crate::errors::GatewayError;
use crate::ports::{StorageDirectory, StoragePolicy, VersionMembership};
use shared_types::{Address, Bytes, FeatureDirectory, FeatureResult, WalletDirectory};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The per-call authorization gate.
pub struct DispatchGatewayService<M: VersionMembership, P: StoragePolicy> {
    /// Version-membership oracle.
    membership: M,
    /// Storage-whitelist oracle.
    policy: P,
    /// Resolves wallet addresses to account objects.
    wallets: Arc<dyn WalletDirectory>,
    /// Resolves feature addresses to capability objects.
    features: Arc<dyn FeatureDirectory>,
    /// Resolves storage addresses to storage objects.
    storages: Arc<dyn StorageDirectory>,
}

impl<M: VersionMembership, P: StoragePolicy> DispatchGatewayService<M, P> {
    /// Creates a gateway over the given oracles and directories.
    pub fn new(
        membership: M,
        policy: P,
        wallets: Arc<dyn WalletDirectory>,
        features: Arc<dyn FeatureDirectory>,
        storages: Arc<dyn StorageDirectory>,
    ) -> Self {
        Self {
            membership,
            policy,
            wallets,
            features,
            storages,
        }
    }

    /// Checks that `feature` may act on `wallet`, and that `storage` (when
    /// given) may be written.
    ///
    /// # Errors
    ///
    /// - `UnknownWallet` when the wallet does not resolve
    /// - `UnauthorizedFeature` when the feature is outside the current version
    /// - `UnauthorizedStorage` when the storage is not whitelisted
    pub async fn authorize(
        &self,
        wallet: Address,
        feature: Address,
        storage: Option<Address>,
    ) -> Result<(), GatewayError> {
        let account = self
            .wallets
            .wallet(wallet)
            .ok_or(GatewayError::UnknownWallet(wallet))?;

        let version = account.current_version();
        if !self.membership.is_feature_in_version(version, feature).await {
            return Err(GatewayError::UnauthorizedFeature { wallet, feature });
        }

        if let Some(storage) = storage {
            if !self.policy.is_authorized(storage).await {
                return Err(GatewayError::UnauthorizedStorage(storage));
            }
        }

        Ok(())
    }

    /// Pure authorization predicate: true iff `authorize` would succeed.
    pub async fn can_invoke(
        &self,
        wallet: Address,
        feature: Address,
        storage: Option<Address>,
    ) -> bool {
        self.authorize(wallet, feature, storage).await.is_ok()
    }

    /// Runs a feature against a wallet after passing authorization.
    ///
    /// The outer `Result` reports authorization and resolution failures; the
    /// inner `FeatureResult` is the feature's own outcome and is returned
    /// verbatim, recovered failures included.
    #[instrument(skip(self, data))]
    pub async fn invoke_feature(
        &self,
        wallet: Address,
        feature: Address,
        data: &Bytes,
    ) -> Result<FeatureResult, GatewayError> {
        self.authorize(wallet, feature, None).await?;

        let capability = self
            .features
            .feature(feature)
            .ok_or(GatewayError::UnknownFeature(feature))?;
        let account = self
            .wallets
            .wallet(wallet)
            .ok_or(GatewayError::UnknownWallet(wallet))?;

        debug!(wallet = ?wallet, feature = ?feature, "Dispatching feature call");
        Ok(capability.execute(account, data).await)
    }

    /// Applies a storage write on a wallet's behalf after passing
    /// authorization for both the calling feature and the target storage.
    #[instrument(skip(self, data))]
    pub async fn invoke_storage(
        &self,
        wallet: Address,
        feature: Address,
        storage: Address,
        data: &Bytes,
    ) -> Result<(), GatewayError> {
        self.authorize(wallet, feature, Some(storage)).await?;

        let target = self
            .storages
            .storage(storage)
            .ok_or(GatewayError::UnknownStorage(storage))?;

        debug!(wallet = ?wallet, storage = ?storage, "Dispatching storage write");
        target
            .write(wallet, data)
            .await
            .map_err(|failure| GatewayError::StorageWriteFailed(failure.to_string()))
    }
}
