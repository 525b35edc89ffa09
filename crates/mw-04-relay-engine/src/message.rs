//! # Canonical Relay Message
//!
//! A relayed call is authorized off-chain by signing a deterministic digest
//! of its entire parameter set. The engine recomputes the same digest from
//! the submitted parameters; any tampering by the relayer changes the digest
//! and the recovered signers no longer satisfy the policy.

use mw_05_signature_verification::{keccak256, personal_message_hash};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, Hash, RelayNonce, U256};

/// Leading bytes of the canonical message.
const MESSAGE_PREFIX: [u8; 2] = [0x19, 0x00];

/// A relayed call as submitted by a relayer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// Wallet the call is executed against.
    pub wallet: Address,
    /// Feature that will execute the call.
    pub feature: Address,
    /// Call payload; the first 4 bytes select the method.
    pub data: Bytes,
    /// Anti-replay nonce, strictly greater than the last consumed one.
    pub nonce: RelayNonce,
    /// Gas price the relayer is reimbursed at; 0 disables the refund.
    pub gas_price: U256,
    /// Upper bound on the gas amount reimbursed.
    pub gas_limit: u64,
    /// Token the refund is paid in (native-asset sentinel included).
    pub refund_token: Address,
    /// Recipient of the refund.
    pub refund_address: Address,
    /// Concatenated 65-byte signatures, in signer order, no embedded count.
    pub signatures: Bytes,
}

impl RelayRequest {
    /// Deterministic byte encoding of everything the signers authorized.
    ///
    /// Layout: `0x19 ‖ 0x00 ‖ wallet ‖ feature ‖ data ‖ chain_id ‖ nonce ‖
    /// gas_price ‖ gas_limit ‖ refund_token ‖ refund_address`, with all
    /// numeric fields as 32-byte big-endian words.
    #[must_use]
    pub fn canonical_message(&self, chain_id: u64) -> Vec<u8> {
        let mut message = Vec::with_capacity(2 + 20 + 20 + self.data.len() + 32 * 4 + 20 + 20);
        message.extend_from_slice(&MESSAGE_PREFIX);
        message.extend_from_slice(self.wallet.as_bytes());
        message.extend_from_slice(self.feature.as_bytes());
        message.extend_from_slice(self.data.as_slice());
        message.extend_from_slice(&be_word(U256::from(chain_id)));
        message.extend_from_slice(&self.nonce.to_be_bytes());
        message.extend_from_slice(&be_word(self.gas_price));
        message.extend_from_slice(&be_word(U256::from(self.gas_limit)));
        message.extend_from_slice(self.refund_token.as_bytes());
        message.extend_from_slice(self.refund_address.as_bytes());
        message
    }

    /// The digest the signatures must have signed: the canonical message is
    /// hashed, then wrapped in the personal-message scheme.
    #[must_use]
    pub fn signed_hash(&self, chain_id: u64) -> Hash {
        let inner = keccak256(&self.canonical_message(chain_id));
        personal_message_hash(&inner)
    }
}

/// Encodes a U256 as a 32-byte big-endian word.
fn be_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}
