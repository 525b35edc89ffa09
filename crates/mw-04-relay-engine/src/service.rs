//! # Relay Engine Service
//!
//! Accepts a signed, off-chain-authorized call, verifies the signer set and
//! nonce, executes the call through the dispatch gateway, and reimburses the
//! submitting relayer from the wallet.
//!
//! Each call moves through `Verifying -> Executing -> Refunding`. The nonce
//! is consumed at the end of verification, before execution, so a retried
//! relay of the same authorized message can never run twice - even when the
//! inner call failed. A failing inner call is recovered and reported as
//! `success = false`; the relayer still did real work, so the refund is paid
//! either way. Every other failure aborts the whole call, and the consumed
//! nonce is restored so no partial state survives.

use crate::errors::RelayError;
use crate::message::RelayRequest;
use crate::nonce::NonceLedger;
use crate::ports::{BalanceLedger, FeatureInvoker, GuardianSource};
use mw_05_signature_verification::{split_concatenated, verify_ecdsa};
use shared_bus::{EventPublisher, WalletEvent};
use shared_types::{
    Address, Bytes, FeatureDirectory, Hash, RelayNonce, Selector, SignaturePolicy,
    WalletDirectory, WalletLockSet, U256,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Relay engine configuration.
#[derive(Debug, Clone)]
pub struct RelayEngineConfig {
    /// Chain identifier bound into every signed message.
    pub chain_id: u64,
    /// Flat gas overhead reimbursed per relay.
    pub base_relay_gas: u64,
    /// Additional gas reimbursed per byte of call payload.
    pub data_gas_per_byte: u64,
}

impl Default for RelayEngineConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            base_relay_gas: 35_000,
            data_gas_per_byte: 16,
        }
    }
}

/// Statistics for the relay engine.
#[derive(Debug, Default, Clone)]
pub struct RelayEngineStats {
    /// Relays that committed (inner success or recovered inner failure).
    pub relays_executed: u64,
    /// Committed relays whose inner feature call failed.
    pub inner_failures: u64,
    /// Refund transfers paid out.
    pub refunds_paid: u64,
    /// Relays rejected during verification or aborted mid-flight.
    pub rejected_requests: u64,
}

/// Outcome of a committed relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReceipt {
    /// Whether the inner feature call succeeded.
    pub success: bool,
    /// Raw return or error bytes of the inner call.
    pub return_data: Bytes,
    /// The digest the signers authorized.
    pub signed_hash: Hash,
    /// Refund amount paid to the relayer, None when `gas_price` was zero.
    pub refund: Option<U256>,
}

/// The meta-transaction relay engine.
pub struct RelayEngineService {
    /// Engine configuration.
    config: RelayEngineConfig,
    /// Resolves wallet addresses to account objects.
    wallets: Arc<dyn WalletDirectory>,
    /// Resolves feature addresses to capability objects.
    features: Arc<dyn FeatureDirectory>,
    /// Guardian membership oracle.
    guardians: Arc<dyn GuardianSource>,
    /// Balances used for refunds.
    ledger: Arc<dyn BalanceLedger>,
    /// Gated feature execution (the dispatch gateway).
    invoker: Arc<dyn FeatureInvoker>,
    /// Per-wallet execution lock, shared with the version registry.
    locks: WalletLockSet,
    /// Event bus for observable transitions.
    events: Arc<dyn EventPublisher>,
    /// Last consumed nonce per wallet.
    nonces: RwLock<NonceLedger>,
    /// Engine statistics.
    stats: RwLock<RelayEngineStats>,
}

impl RelayEngineService {
    /// Creates a relay engine over the given collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RelayEngineConfig,
        wallets: Arc<dyn WalletDirectory>,
        features: Arc<dyn FeatureDirectory>,
        guardians: Arc<dyn GuardianSource>,
        ledger: Arc<dyn BalanceLedger>,
        invoker: Arc<dyn FeatureInvoker>,
        locks: WalletLockSet,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            wallets,
            features,
            guardians,
            ledger,
            invoker,
            locks,
            events,
            nonces: RwLock::new(NonceLedger::new()),
            stats: RwLock::new(RelayEngineStats::default()),
        }
    }

    /// Executes a relayed call submitted by `relayer`.
    ///
    /// On `Ok`, the relay committed: the nonce is consumed, the refund (if
    /// priced) is paid, and the receipt reports the inner call's outcome.
    /// On `Err`, nothing committed.
    ///
    /// # Errors
    ///
    /// See [`RelayError`]; every variant leaves the wallet's relay state
    /// untouched.
    #[instrument(skip(self, request), fields(wallet = ?request.wallet, feature = ?request.feature))]
    pub async fn execute(
        &self,
        relayer: Address,
        request: RelayRequest,
    ) -> Result<RelayReceipt, RelayError> {
        match self.execute_inner(relayer, &request).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                self.stats.write().await.rejected_requests += 1;
                warn!(relayer = ?relayer, error = %err, "Relay rejected");
                Err(err)
            }
        }
    }

    /// The last consumed relay nonce for a wallet, zero before the first
    /// relay.
    pub async fn relay_nonce(&self, wallet: Address) -> RelayNonce {
        self.nonces.read().await.last_nonce(wallet)
    }

    /// Current engine statistics.
    pub async fn stats(&self) -> RelayEngineStats {
        self.stats.read().await.clone()
    }

    // =========================================================================
    // STATE MACHINE
    // =========================================================================

    async fn execute_inner(
        &self,
        relayer: Address,
        request: &RelayRequest,
    ) -> Result<RelayReceipt, RelayError> {
        // --- Verifying ---------------------------------------------------
        let account = self
            .wallets
            .wallet(request.wallet)
            .ok_or(RelayError::UnknownWallet(request.wallet))?;
        if account.is_locked() {
            return Err(RelayError::WalletLocked(request.wallet));
        }

        let feature = self
            .features
            .feature(request.feature)
            .ok_or(RelayError::UnknownFeature(request.feature))?;

        let selector =
            Selector::from_data(request.data.as_slice()).ok_or(RelayError::InvalidMethodData)?;
        let policy = feature
            .required_signatures(selector)
            .ok_or(RelayError::UnknownMethod(selector))?;

        let signed_hash = request.signed_hash(self.config.chain_id);
        let signers = self.recover_signers(&signed_hash, request.signatures.as_slice(), policy)?;
        self.check_policy(policy, &signers, account.owner(), request.wallet)?;

        debug!(signers = signers.len(), "Relay authenticated");

        // The nonce is consumed before execution; a retry of this exact
        // message is a replay from here on, whatever happens next.
        let previous = {
            let mut nonces = self.nonces.write().await;
            nonces.try_consume(request.wallet, request.nonce)?
        };

        // --- Executing / Refunding ---------------------------------------
        // Any abort past this point restores the nonce: the whole top-level
        // call either commits or leaves no trace.
        match self.execute_locked(relayer, request, signed_hash).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                self.nonces.write().await.restore(request.wallet, previous);
                Err(err)
            }
        }
    }

    async fn execute_locked(
        &self,
        relayer: Address,
        request: &RelayRequest,
        signed_hash: Hash,
    ) -> Result<RelayReceipt, RelayError> {
        let _guard = self.locks.acquire(request.wallet)?;

        let inner = self
            .invoker
            .invoke(request.wallet, request.feature, &request.data)
            .await?;

        // A feature-level failure is recorded, not propagated: the relay's
        // own bookkeeping still commits.
        let (success, return_data) = match inner {
            Ok(data) => (true, data),
            Err(failure) => (false, failure.error),
        };

        let refund = if request.gas_price > U256::zero() {
            Some(self.pay_refund(request).await?)
        } else {
            None
        };

        {
            let mut stats = self.stats.write().await;
            stats.relays_executed += 1;
            if !success {
                stats.inner_failures += 1;
            }
            if refund.is_some() {
                stats.refunds_paid += 1;
            }
        }

        info!(
            relayer = ?relayer,
            success,
            refund = ?refund,
            "Relay executed"
        );
        self.events
            .publish(WalletEvent::TransactionExecuted {
                wallet: request.wallet,
                success,
                return_data: return_data.clone(),
                signed_hash,
            })
            .await;

        Ok(RelayReceipt {
            success,
            return_data,
            signed_hash,
            refund,
        })
    }

    async fn pay_refund(&self, request: &RelayRequest) -> Result<U256, RelayError> {
        let data_gas = self
            .config
            .data_gas_per_byte
            .saturating_mul(request.data.len() as u64);
        let consumed = self
            .config
            .base_relay_gas
            .saturating_add(data_gas)
            .min(request.gas_limit);
        let amount = request
            .gas_price
            .checked_mul(U256::from(consumed))
            .unwrap_or(U256::MAX);

        self.ledger
            .transfer(
                request.wallet,
                request.refund_token,
                request.refund_address,
                amount,
            )
            .await?;

        self.events
            .publish(WalletEvent::Refunded {
                wallet: request.wallet,
                refund_address: request.refund_address,
                refund_token: request.refund_token,
                amount,
            })
            .await;

        Ok(amount)
    }

    // =========================================================================
    // SIGNER VALIDATION
    // =========================================================================

    fn recover_signers(
        &self,
        signed_hash: &Hash,
        blob: &[u8],
        policy: SignaturePolicy,
    ) -> Result<Vec<Address>, RelayError> {
        let signatures = split_concatenated(blob)
            .map_err(|err| RelayError::InvalidSignatures(err.to_string()))?;

        let required = policy.required_count();
        if signatures.len() != required {
            return Err(RelayError::InvalidSignatures(format!(
                "expected {required} signatures, got {}",
                signatures.len()
            )));
        }

        signatures
            .iter()
            .map(|signature| {
                let result = verify_ecdsa(signed_hash, signature);
                match (result.valid, result.recovered_address) {
                    (true, Some(address)) => Ok(address),
                    _ => Err(RelayError::InvalidSignatures(
                        result
                            .error
                            .map_or_else(|| "recovery failed".to_string(), |e| e.to_string()),
                    )),
                }
            })
            .collect()
    }

    fn check_policy(
        &self,
        policy: SignaturePolicy,
        signers: &[Address],
        owner: Address,
        wallet: Address,
    ) -> Result<(), RelayError> {
        match policy {
            SignaturePolicy::RequireOwner => self.check_owner(&signers[0], owner),
            SignaturePolicy::RequireOwnerAndGuardians(_) => {
                self.check_owner(&signers[0], owner)?;
                self.check_guardians(wallet, &signers[1..])
            }
            SignaturePolicy::RequireGuardiansOnly(_) => self.check_guardians(wallet, signers),
        }
    }

    fn check_owner(&self, signer: &Address, owner: Address) -> Result<(), RelayError> {
        if *signer != owner {
            return Err(RelayError::InvalidSignatures(format!(
                "signer {signer:?} is not the wallet owner"
            )));
        }
        Ok(())
    }

    /// Guardian signatures must come from distinct current guardians, in
    /// strictly ascending signer-address order. The ordering rule doubles as
    /// the duplicate check.
    fn check_guardians(&self, wallet: Address, signers: &[Address]) -> Result<(), RelayError> {
        let mut previous: Option<Address> = None;
        for signer in signers {
            if let Some(prev) = previous {
                if *signer <= prev {
                    return Err(RelayError::InvalidSignatures(
                        "guardian signatures must be in ascending signer order".to_string(),
                    ));
                }
            }
            if !self.guardians.is_guardian(wallet, *signer) {
                return Err(RelayError::InvalidSignatures(format!(
                    "signer {signer:?} is not a guardian"
                )));
            }
            previous = Some(*signer);
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
