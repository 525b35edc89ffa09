//! # Per-Wallet Nonce Ledger
//!
//! Tracks the last consumed relay nonce per wallet. A signed relay message
//! becomes permanently unusable once its nonce is consumed, whether the
//! inner call succeeded or not; the only way forward is a fresh signature
//! over a higher nonce.

use shared_types::{Address, RelayNonce};
use std::collections::HashMap;
use thiserror::Error;

/// A submitted nonce did not exceed the last consumed one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("nonce replay: submitted {submitted:?}, last consumed {last:?}")]
pub struct NonceReplayError {
    /// The nonce the relayer submitted.
    pub submitted: RelayNonce,
    /// The highest nonce consumed so far.
    pub last: RelayNonce,
}

/// Last consumed nonce per wallet; entries are created lazily on first relay
/// and only ever grow.
#[derive(Debug, Default)]
pub struct NonceLedger {
    last: HashMap<Address, RelayNonce>,
}

impl NonceLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last consumed nonce for a wallet, zero before the first relay.
    #[must_use]
    pub fn last_nonce(&self, wallet: Address) -> RelayNonce {
        self.last.get(&wallet).copied().unwrap_or(RelayNonce::ZERO)
    }

    /// Consumes a nonce if it is strictly greater than the last one.
    ///
    /// Returns the previous entry so an aborting caller can restore it.
    ///
    /// # Errors
    ///
    /// `NonceReplayError` when the nonce does not strictly increase.
    pub fn try_consume(
        &mut self,
        wallet: Address,
        nonce: RelayNonce,
    ) -> Result<Option<RelayNonce>, NonceReplayError> {
        let last = self.last_nonce(wallet);
        if nonce <= last {
            return Err(NonceReplayError {
                submitted: nonce,
                last,
            });
        }
        Ok(self.last.insert(wallet, nonce))
    }

    /// Restores the entry returned by `try_consume` after an aborted call.
    pub fn restore(&mut self, wallet: Address, previous: Option<RelayNonce>) {
        match previous {
            Some(nonce) => {
                self.last.insert(wallet, nonce);
            }
            None => {
                self.last.remove(&wallet);
            }
        }
    }
}
