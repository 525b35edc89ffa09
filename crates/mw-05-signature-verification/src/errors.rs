//! # Signature Errors
//!
//! Error types for signature verification operations.

use shared_types::Address;
use thiserror::Error;

/// Errors that can occur during signature verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The signature format is invalid (component out of range, invalid encoding)
    #[error("Invalid signature format")]
    InvalidFormat,

    /// A concatenated signature blob is not a whole number of 65-byte units
    #[error("Invalid signature blob length: {0} is not a multiple of 65")]
    InvalidLength(usize),

    /// Signature has high S value (malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Recovered signer does not match expected signer
    #[error("Signer mismatch: expected {expected:?}, got {actual:?}")]
    SignerMismatch {
        /// The signer the caller required.
        expected: Address,
        /// The signer actually recovered from the signature.
        actual: Address,
    },
}
