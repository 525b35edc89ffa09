//! # Signature Verification Subsystem (MW-05)
//!
//! Cryptographic verification of the signatures that authorize relayed
//! wallet calls.
//!
//! ## Architecture
//!
//! Pure domain logic, no I/O: the relay engine calls directly into this
//! crate to hash canonical messages and recover signer addresses.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention**: signatures with high S values are rejected,
//!   so a signed relay message has exactly one accepted encoding.
//! - **Strict scalar validation**: R and S outside [1, n-1], or an R that is
//!   not a curve x-coordinate, fail before any recovery is attempted.

pub mod ecdsa;
pub mod entities;
pub mod errors;

// Re-export public API
pub use ecdsa::{
    address_from_pubkey, invert_s, keccak256, personal_message_hash, recover_address,
    verify_ecdsa, verify_ecdsa_signer, EcdsaVerifier,
};
pub use entities::{split_concatenated, EcdsaSignature, VerificationResult, SIGNATURE_LENGTH};
pub use errors::SignatureError;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 5;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Signature Verification";
