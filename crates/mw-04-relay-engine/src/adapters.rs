//! # Adapters
//!
//! The gateway adapter plugs the dispatch gateway into the engine's
//! `FeatureInvoker` port; the in-memory ledger and guardian table back local
//! wiring and tests.

use crate::ports::{BalanceLedger, FeatureInvoker, GuardianSource, LedgerError};
use async_trait::async_trait;
use mw_03_dispatch_gateway::{
    DispatchGatewayService, GatewayError, StoragePolicy, VersionMembership,
};
use shared_types::{Address, Bytes, FeatureResult, U256};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock as StdRwLock;
use tokio::sync::RwLock;

// =============================================================================
// GATEWAY-BACKED INVOKER
// =============================================================================

#[async_trait]
impl<M, P> FeatureInvoker for DispatchGatewayService<M, P>
where
    M: VersionMembership,
    P: StoragePolicy,
{
    async fn invoke(
        &self,
        wallet: Address,
        feature: Address,
        data: &Bytes,
    ) -> Result<FeatureResult, GatewayError> {
        self.invoke_feature(wallet, feature, data).await
    }
}

// =============================================================================
// IN-MEMORY BALANCE LEDGER
// =============================================================================

/// Balance ledger backed by a map keyed by (holder, token).
#[derive(Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<(Address, Address), U256>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `holder` with `amount` of `token`.
    pub async fn credit(&self, holder: Address, token: Address, amount: U256) {
        let mut balances = self.balances.write().await;
        let entry = balances.entry((holder, token)).or_insert_with(U256::zero);
        *entry = entry.saturating_add(amount);
    }
}

#[async_trait]
impl BalanceLedger for InMemoryLedger {
    async fn balance(&self, holder: Address, token: Address) -> U256 {
        self.balances
            .read()
            .await
            .get(&(holder, token))
            .copied()
            .unwrap_or_else(U256::zero)
    }

    async fn transfer(
        &self,
        from: Address,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut balances = self.balances.write().await;
        let available = balances
            .get(&(from, token))
            .copied()
            .unwrap_or_else(U256::zero);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                wallet: from,
                token,
                required: amount,
                available,
            });
        }
        balances.insert((from, token), available - amount);
        let credit = balances.entry((to, token)).or_insert_with(U256::zero);
        *credit = credit.saturating_add(amount);
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY GUARDIAN TABLE
// =============================================================================

/// Guardian table backed by a map.
#[derive(Default)]
pub struct InMemoryGuardians {
    guardians: StdRwLock<HashMap<Address, HashSet<Address>>>,
}

impl InMemoryGuardians {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guardian for a wallet.
    pub fn add_guardian(&self, wallet: Address, guardian: Address) {
        self.guardians
            .write()
            .unwrap()
            .entry(wallet)
            .or_default()
            .insert(guardian);
    }
}

impl GuardianSource for InMemoryGuardians {
    fn is_guardian(&self, wallet: Address, signer: Address) -> bool {
        self.guardians
            .read()
            .unwrap()
            .get(&wallet)
            .is_some_and(|set| set.contains(&signer))
    }
}
