//! # Error Types

use shared_types::Address;
use thiserror::Error;

/// Errors from dispatch authorization and gated invocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The wallet address does not resolve.
    #[error("unknown wallet: {0:?}")]
    UnknownWallet(Address),

    /// The feature is not part of the wallet's current version.
    #[error("feature {feature:?} is not active for wallet {wallet:?}")]
    UnauthorizedFeature {
        /// The wallet the call targeted.
        wallet: Address,
        /// The rejected feature.
        feature: Address,
    },

    /// The storage is not on the platform whitelist.
    #[error("invalid storage invoked: {0:?}")]
    UnauthorizedStorage(Address),

    /// The feature address does not resolve to a capability object.
    #[error("unknown feature: {0:?}")]
    UnknownFeature(Address),

    /// The storage address does not resolve to a storage object.
    #[error("unknown storage: {0:?}")]
    UnknownStorage(Address),

    /// An authorized storage write failed in the storage itself.
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),
}
