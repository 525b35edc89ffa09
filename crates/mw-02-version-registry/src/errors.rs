//! # Error Types
//!
//! All error types for version management and wallet upgrades.

use shared_types::{Address, LockError, VersionId};
use thiserror::Error;

/// Errors from version registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A feature listed for initialization is not part of the bundle.
    #[error("invalid init set: {0:?} is not in the feature list")]
    InvalidInitSet(Address),

    /// The bundle is empty.
    #[error("a version requires at least one feature")]
    EmptyFeatureSet,

    /// The same feature appears twice in the bundle.
    #[error("duplicate feature in bundle: {0:?}")]
    DuplicateFeature(Address),

    /// A feature is not vetted in the module registry.
    #[error("unregistered module: {0:?}")]
    UnregisteredModule(Address),

    /// The requested minimum version is zero or above the latest version.
    #[error("invalid minimum version: {0}")]
    InvalidMinVersion(VersionId),

    /// The version id does not exist.
    #[error("unknown version: {0}")]
    UnknownVersion(VersionId),

    /// The target version is below the platform minimum.
    #[error("version {requested} is below the minimum {min}")]
    BelowMinVersion {
        /// The version the upgrade asked for.
        requested: VersionId,
        /// The current watermark.
        min: VersionId,
    },

    /// The wallet already runs the target version.
    #[error("wallet already on version {0}")]
    AlreadyCurrent(VersionId),

    /// The caller is not the platform owner.
    #[error("caller {0:?} is not the platform owner")]
    NotPlatformOwner(Address),

    /// The caller is not the wallet owner.
    #[error("caller {caller:?} is not the owner of wallet {wallet:?}")]
    NotWalletOwner {
        /// The rejected caller.
        caller: Address,
        /// The wallet the caller tried to upgrade.
        wallet: Address,
    },

    /// The wallet address does not resolve.
    #[error("unknown wallet: {0:?}")]
    UnknownWallet(Address),

    /// The wallet is locked and cannot be upgraded.
    #[error("wallet {0:?} is locked")]
    WalletLocked(Address),

    /// An init feature is not resolvable at upgrade time.
    #[error("feature unavailable: {0:?}")]
    FeatureUnavailable(Address),

    /// An init hook failed; the upgrade is rolled back.
    #[error("init hook of {feature:?} failed: {reason}")]
    InitHookFailed {
        /// The feature whose hook failed.
        feature: Address,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The wallet is mid-call; upgrades cannot nest.
    #[error(transparent)]
    Reentrancy(#[from] LockError),
}
