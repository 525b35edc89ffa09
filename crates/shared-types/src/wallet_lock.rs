//! # Per-Wallet Execution Lock
//!
//! One top-level call per wallet at a time. The lock is acquired on entry to
//! any version-changing or relayed call and released by guard drop on every
//! exit path, recovered failures included. A nested acquisition attempt for
//! the same wallet fails instead of blocking.

use crate::value_objects::Address;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors from lock acquisition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The wallet is already executing a top-level call.
    #[error("reentrant call: wallet {0:?} is already executing")]
    AlreadyHeld(Address),
}

/// Set of wallets currently executing a top-level call.
///
/// Cheap to clone; clones share the same underlying set so the version
/// registry and the relay engine exclude each other per wallet.
#[derive(Clone, Default)]
pub struct WalletLockSet {
    held: Arc<Mutex<HashSet<Address>>>,
}

impl WalletLockSet {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for a wallet.
    ///
    /// # Errors
    ///
    /// `LockError::AlreadyHeld` when the wallet is mid-call. Never blocks.
    pub fn acquire(&self, wallet: Address) -> Result<WalletLockGuard, LockError> {
        let mut held = self.held.lock().unwrap();
        if !held.insert(wallet) {
            return Err(LockError::AlreadyHeld(wallet));
        }
        Ok(WalletLockGuard {
            held: self.held.clone(),
            wallet,
        })
    }

    /// Whether the wallet is currently mid-call.
    #[must_use]
    pub fn is_held(&self, wallet: Address) -> bool {
        self.held.lock().unwrap().contains(&wallet)
    }
}

/// RAII guard for a wallet's execution lock.
///
/// Releases the lock on drop; holding the guard across `.await` points is
/// allowed since release only touches the set on drop.
pub struct WalletLockGuard {
    held: Arc<Mutex<HashSet<Address>>>,
    wallet: Address,
}

impl WalletLockGuard {
    /// The wallet this guard locks.
    #[must_use]
    pub fn wallet(&self) -> Address {
        self.wallet
    }
}

impl Drop for WalletLockGuard {
    fn drop(&mut self) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(&self.wallet);
        }
    }
}
