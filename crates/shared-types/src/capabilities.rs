//! # Capability Traits
//!
//! Interfaces of the external collaborators the wallet core operates on.
//! The core never owns these objects; it resolves them through directories
//! and drives them through the traits below.
//!
//! - A wallet account holds the ownership record and the active version
//!   pointer; the core reads `owner`/`is_locked` and advances the version
//!   during upgrades.
//! - A feature is a pluggable capability module: it declares which method
//!   selectors it recognizes, which signature policy each method demands,
//!   and exposes an upgrade-time initialization hook.
//! - The module registry is the platform-wide catalogue of vetted feature
//!   addresses; version creation refuses anything outside it.

use crate::value_objects::{Address, Bytes, Selector, VersionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// SIGNATURE POLICY
// =============================================================================

/// Who must sign a relayed invocation of a given method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignaturePolicy {
    /// The wallet owner alone.
    RequireOwner,
    /// The wallet owner plus `k` distinct guardians.
    RequireOwnerAndGuardians(usize),
    /// `k` distinct guardians, owner signature not accepted.
    RequireGuardiansOnly(usize),
}

impl SignaturePolicy {
    /// Number of signatures the policy expects.
    #[must_use]
    pub fn required_count(&self) -> usize {
        match self {
            Self::RequireOwner => 1,
            Self::RequireOwnerAndGuardians(k) => 1 + k,
            Self::RequireGuardiansOnly(k) => *k,
        }
    }
}

// =============================================================================
// FEATURE CALL OUTCOME
// =============================================================================

/// A recovered failure raised by a feature's own logic.
///
/// Carries the raw error payload so callers can report it without
/// interpreting it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFailure {
    /// Raw error bytes produced by the feature.
    pub error: Bytes,
}

impl FeatureFailure {
    /// Wraps raw error bytes.
    #[must_use]
    pub fn new(error: Bytes) -> Self {
        Self { error }
    }

    /// Convenience constructor from a human-readable reason.
    #[must_use]
    pub fn from_reason(reason: &str) -> Self {
        Self {
            error: Bytes::from_slice(reason.as_bytes()),
        }
    }
}

impl fmt::Display for FeatureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.error.as_slice()) {
            Ok(reason) => write!(f, "feature call failed: {reason}"),
            Err(_) => write!(f, "feature call failed: {:?}", self.error),
        }
    }
}

/// Result of a feature invocation: return data or a recovered failure.
pub type FeatureResult = Result<Bytes, FeatureFailure>;

// =============================================================================
// WALLET ACCOUNT
// =============================================================================

/// The wallet account object, owned by the external proxy layer.
pub trait WalletAccount: Send + Sync {
    /// The wallet's own address.
    fn address(&self) -> Address;

    /// Current owner of the wallet.
    fn owner(&self) -> Address;

    /// Whether the wallet is locked (e.g. by a recovery procedure).
    fn is_locked(&self) -> bool;

    /// The version the wallet currently runs, 0 if never upgraded.
    fn current_version(&self) -> VersionId;

    /// Advances the wallet to a new version. Written only during upgrade.
    fn set_current_version(&self, version: VersionId);

    /// Replaces the wallet-level module ACL with the given bundle.
    fn authorize_modules(&self, modules: &[Address]);

    /// The currently authorized module set.
    fn authorized_modules(&self) -> Vec<Address>;
}

// =============================================================================
// FEATURE
// =============================================================================

/// A pluggable capability module.
#[async_trait]
pub trait Feature: Send + Sync {
    /// Address under which the feature is registered.
    fn address(&self) -> Address;

    /// Whether the feature recognizes the given method selector.
    fn is_valid_method(&self, selector: Selector) -> bool;

    /// Signature policy for the given method, None for unknown selectors.
    fn required_signatures(&self, selector: Selector) -> Option<SignaturePolicy>;

    /// Upgrade-time initialization hook, run once per wallet entering a
    /// version that lists this feature in its init set.
    async fn init(&self, wallet: Arc<dyn WalletAccount>) -> Result<(), FeatureFailure>;

    /// Executes the feature's logic against the wallet.
    async fn execute(&self, wallet: Arc<dyn WalletAccount>, data: &Bytes) -> FeatureResult;
}

// =============================================================================
// STORAGE
// =============================================================================

/// A persistent key/value store a feature may write to.
///
/// The core authorizes writes but never interprets the payload.
#[async_trait]
pub trait WalletStorage: Send + Sync {
    /// Address under which the storage is registered.
    fn address(&self) -> Address;

    /// Applies an opaque write on behalf of a wallet.
    async fn write(&self, wallet: Address, data: &Bytes) -> Result<(), FeatureFailure>;
}

// =============================================================================
// MODULE REGISTRY
// =============================================================================

/// Static catalogue of globally vetted module addresses.
pub trait ModuleRegistry: Send + Sync {
    /// Whether the address has been vetted for inclusion in versions.
    fn is_registered_module(&self, module: Address) -> bool;
}

// =============================================================================
// DIRECTORIES
// =============================================================================

/// Resolves wallet addresses to live account objects.
pub trait WalletDirectory: Send + Sync {
    /// Looks up a wallet; None if the address is not a known wallet.
    fn wallet(&self, address: Address) -> Option<Arc<dyn WalletAccount>>;
}

/// Resolves feature addresses to live capability objects.
pub trait FeatureDirectory: Send + Sync {
    /// Looks up a feature; None if the address is not a known feature.
    fn feature(&self, address: Address) -> Option<Arc<dyn Feature>>;
}

// =============================================================================
// TESTS
// =============================================================================
