//! # Driven Ports (Outbound)
//!
//! Interfaces the relay engine depends on:
//! - guardian membership, for multi-signature policies
//! - the balance ledger, for gas refunds
//! - the dispatch gateway, for authorized feature execution

use async_trait::async_trait;
use mw_03_dispatch_gateway::GatewayError;
use shared_types::{Address, Bytes, FeatureResult, U256};
use thiserror::Error;

// =============================================================================
// GUARDIAN MEMBERSHIP
// =============================================================================

/// Guardian membership oracle.
///
/// Guardians are maintained by a recovery feature out of scope here; the
/// engine only needs the membership predicate.
pub trait GuardianSource: Send + Sync {
    /// Whether `signer` is currently a guardian of `wallet`.
    fn is_guardian(&self, wallet: Address, signer: Address) -> bool;
}

// =============================================================================
// BALANCE LEDGER
// =============================================================================

/// Errors from refund transfers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The paying wallet does not hold the required amount.
    #[error("insufficient balance: wallet {wallet:?} holds {available} of token {token:?}, {required} required")]
    InsufficientBalance {
        /// The paying wallet.
        wallet: Address,
        /// Token the transfer was attempted in.
        token: Address,
        /// Amount requested.
        required: U256,
        /// Amount actually held.
        available: U256,
    },
}

/// Token and native-asset balances of wallets.
#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Balance of `holder` in `token`.
    async fn balance(&self, holder: Address, token: Address) -> U256;

    /// Moves `amount` of `token` from `from` to `to`.
    async fn transfer(
        &self,
        from: Address,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}

// =============================================================================
// FEATURE INVOCATION
// =============================================================================

/// Gated feature execution (fulfilled by the dispatch gateway).
#[async_trait]
pub trait FeatureInvoker: Send + Sync {
    /// Runs `feature` against `wallet` after authorization.
    ///
    /// The outer `Result` carries authorization failures; the inner
    /// `FeatureResult` is the feature's own outcome.
    async fn invoke(
        &self,
        wallet: Address,
        feature: Address,
        data: &Bytes,
    ) -> Result<FeatureResult, GatewayError>;
}
