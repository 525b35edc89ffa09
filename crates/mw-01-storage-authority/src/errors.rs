//! # Error Types

use shared_types::Address;
use thiserror::Error;

/// Errors from storage authorization operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageAuthorityError {
    /// The storage is already on the whitelist.
    #[error("storage already added: {0:?}")]
    StorageAlreadyAdded(Address),

    /// The caller is not the platform owner.
    #[error("caller {0:?} is not the platform owner")]
    NotPlatformOwner(Address),
}
