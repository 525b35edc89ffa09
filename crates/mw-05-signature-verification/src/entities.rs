//! # Signature Entities
//!
//! Core data structures for signature verification.

use crate::errors::SignatureError;
use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Wire size of one signature: `r (32) ‖ s (32) ‖ v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

// =============================================================================
// ECDSA SIGNATURE (secp256k1)
// =============================================================================

/// ECDSA signature on the secp256k1 curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl EcdsaSignature {
    /// Creates a signature from components.
    #[must_use]
    pub const fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Parses one signature from its 65-byte wire form.
    ///
    /// # Errors
    ///
    /// `SignatureError::InvalidLength` when the slice is not exactly 65 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Encodes the signature into its 65-byte wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }
}

/// Splits a concatenated signature blob into individual signatures.
///
/// The blob carries no embedded count; its length must be an exact multiple
/// of the 65-byte signature size.
///
/// # Errors
///
/// `SignatureError::InvalidLength` on any remainder.
pub fn split_concatenated(blob: &[u8]) -> Result<Vec<EcdsaSignature>, SignatureError> {
    if blob.len() % SIGNATURE_LENGTH != 0 {
        return Err(SignatureError::InvalidLength(blob.len()));
    }
    blob.chunks(SIGNATURE_LENGTH)
        .map(EcdsaSignature::from_bytes)
        .collect()
}

// =============================================================================
// VERIFICATION RESULT
// =============================================================================

/// Result of signature verification.
#[derive(Clone, Debug)]
pub struct VerificationResult {
    /// Whether the signature is valid
    pub valid: bool,
    /// The recovered address (if verification succeeded)
    pub recovered_address: Option<Address>,
    /// Error details (if verification failed)
    pub error: Option<SignatureError>,
}

impl VerificationResult {
    /// Create a successful verification result.
    #[must_use]
    pub fn valid(recovered_address: Address) -> Self {
        Self {
            valid: true,
            recovered_address: Some(recovered_address),
            error: None,
        }
    }

    /// Create a failed verification result.
    #[must_use]
    pub fn invalid(error: SignatureError) -> Self {
        Self {
            valid: false,
            recovered_address: None,
            error: Some(error),
        }
    }
}
