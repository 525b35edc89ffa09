//! # ECDSA Verification (secp256k1)
//!
//! Pure domain logic for verifying the signatures that authorize relayed
//! wallet calls.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention**: S must be strictly less than half the curve
//!   order; the high-S twin of a valid signature is rejected.
//! - **Scalar Range Validation**: R and S must be in [1, n-1].
//! - **R Point Validation**: R must be a valid x-coordinate on the secp256k1
//!   curve.
//! - **Constant-Time Operations**: comparisons against curve constants use the
//!   `subtle` crate for side-channel resistance.

use crate::entities::{EcdsaSignature, VerificationResult};
use crate::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::{AffinePoint, EncodedPoint};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (for malleability check).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Prefix of the personal-message signing scheme.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// =============================================================================
// ECDSA VERIFIER
// =============================================================================

/// ECDSA signature verifier.
#[derive(Debug, Clone, Default)]
pub struct EcdsaVerifier;

impl EcdsaVerifier {
    /// Create a new ECDSA verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verify an ECDSA signature and recover the signer address.
    pub fn verify_ecdsa(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
    ) -> VerificationResult {
        verify_ecdsa(message_hash, signature)
    }

    /// Verify an ECDSA signature and check that recovered signer matches expected.
    pub fn verify_ecdsa_signer(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
        expected: Address,
    ) -> VerificationResult {
        verify_ecdsa_signer(message_hash, signature, expected)
    }

    /// Recover the signer's address from a signature.
    pub fn recover_address(
        &self,
        message_hash: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, SignatureError> {
        recover_address(message_hash, signature)
    }
}

// =============================================================================
// CORE VERIFICATION FUNCTIONS
// =============================================================================

/// Verify an ECDSA signature and recover the signer address.
///
/// Security validations performed:
/// 1. R is in valid range [1, n-1]
/// 2. R is a valid x-coordinate on the secp256k1 curve
/// 3. S is in valid range [1, n-1]
/// 4. S is in the lower half of the curve order
/// 5. Recovery ID (v) is valid (0, 1, 27, or 28)
/// 6. Public key recovery succeeds
pub fn verify_ecdsa(message_hash: &Hash, signature: &EcdsaSignature) -> VerificationResult {
    // Validate R is in range [1, n-1] (not zero, not >= curve order)
    if !is_valid_scalar(&signature.r) {
        return VerificationResult::invalid(SignatureError::InvalidFormat);
    }

    // Validate R is a valid x-coordinate on the secp256k1 curve
    if !is_valid_r_coordinate(&signature.r) {
        return VerificationResult::invalid(SignatureError::InvalidFormat);
    }

    // Validate S is in range [1, n-1] (not zero, not >= curve order)
    if !is_valid_scalar(&signature.s) {
        return VerificationResult::invalid(SignatureError::InvalidFormat);
    }

    // S must be in the lower half of the curve order
    if !is_low_s(&signature.s) {
        return VerificationResult::invalid(SignatureError::MalleableSignature);
    }

    // Recover address
    match recover_address(message_hash, signature) {
        Ok(address) => VerificationResult::valid(address),
        Err(e) => VerificationResult::invalid(e),
    }
}

/// Verify an ECDSA signature and check that recovered signer matches expected.
pub fn verify_ecdsa_signer(
    message_hash: &Hash,
    signature: &EcdsaSignature,
    expected: Address,
) -> VerificationResult {
    let result = verify_ecdsa(message_hash, signature);

    if !result.valid {
        return result;
    }

    if let Some(recovered) = result.recovered_address {
        if recovered != expected {
            return VerificationResult::invalid(SignatureError::SignerMismatch {
                expected,
                actual: recovered,
            });
        }
    }

    result
}

/// Recover the signer's address from a signature.
pub fn recover_address(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    // Parse recovery ID
    let recovery_id = parse_recovery_id(signature.v)?;

    // Construct k256 signature from r and s; the intermediate buffer is
    // zeroized once parsed.
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);

    let sig = match Signature::from_slice(&sig_bytes) {
        Ok(s) => {
            sig_bytes.zeroize();
            s
        }
        Err(_) => {
            sig_bytes.zeroize();
            return Err(SignatureError::InvalidFormat);
        }
    };

    // Recover the verifying key (public key)
    let recovered_key =
        VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &sig, recovery_id)
            .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Keccak256 hash function.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    Hash::new(hash)
}

/// Wraps a digest in the personal-message scheme:
/// `keccak256("\x19Ethereum Signed Message:\n32" ‖ digest)`.
#[must_use]
pub fn personal_message_hash(digest: &Hash) -> Hash {
    let mut input = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 32);
    input.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    input.extend_from_slice(digest.as_bytes());
    keccak256(&input)
}

/// Derive an address from a public key: last 20 bytes of
/// `keccak256(uncompressed pubkey without the 0x04 prefix)`.
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    // Take last 20 bytes as address
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.as_bytes()[12..]);
    Address::new(address)
}

/// Check if S value is in lower half of curve order.
///
/// Constant-time: the comparison runs in fixed time regardless of input
/// values.
fn is_low_s(s: &[u8; 32]) -> bool {
    // Constant-time comparison: s < SECP256K1_HALF_ORDER (strict inequality)
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = s[i];
        let h_byte = SECP256K1_HALF_ORDER[i];

        // Only update if we haven't already determined the result
        let not_decided = !(less | greater);
        let byte_less = Choice::from(u8::from(s_byte < h_byte));
        let byte_greater = Choice::from(u8::from(s_byte > h_byte));

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
///
/// Constant-time for the same reason as `is_low_s`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    // Constant-time check for zero
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    // Constant-time check for scalar < curve order
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = scalar[i];
        let n_byte = SECP256K1_ORDER[i];

        let not_decided = !(less | greater);
        let byte_less = Choice::from(u8::from(s_byte < n_byte));
        let byte_greater = Choice::from(u8::from(s_byte > n_byte));

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    // Valid if: NOT zero AND less than order
    let not_zero = !is_zero;
    let valid = not_zero & less;
    valid.into()
}

/// Validate that R is a valid x-coordinate on the secp256k1 curve.
///
/// Only about half of all field elements have corresponding y-values on the
/// curve; a fabricated R outside that set can never belong to a real
/// signature.
fn is_valid_r_coordinate(r: &[u8; 32]) -> bool {
    // Try to decompress a point with this x-coordinate (even y-parity)
    let mut compressed = [0u8; 33];
    compressed[0] = 0x02;
    compressed[1..].copy_from_slice(r);

    let encoded = match EncodedPoint::from_bytes(compressed) {
        Ok(e) => e,
        Err(_) => return false,
    };

    let point = AffinePoint::from_encoded_point(&encoded);
    point.is_some().into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// Invert S value: s' = n - s
#[must_use]
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(s[i]) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================


// =============================================================================
// UNIT TESTS
// =============================================================================
