//! # Error Types
//!
//! All error types for the relay engine. Everything here aborts the whole
//! relay with no state change; the one recovered failure mode - the inner
//! feature call failing - is not an error but a `success = false` receipt.

use crate::nonce::NonceReplayError;
use crate::ports::LedgerError;
use mw_03_dispatch_gateway::GatewayError;
use shared_types::{Address, LockError, Selector};
use thiserror::Error;

/// Errors from relayed execution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The wallet address does not resolve.
    #[error("unknown wallet: {0:?}")]
    UnknownWallet(Address),

    /// The feature address does not resolve.
    #[error("unknown feature: {0:?}")]
    UnknownFeature(Address),

    /// The wallet is locked; relays are refused outright.
    #[error("wallet {0:?} is locked")]
    WalletLocked(Address),

    /// The call payload is too short to carry a method selector.
    #[error("call payload shorter than a method selector")]
    InvalidMethodData,

    /// The target feature does not recognize the method.
    #[error("unknown method: {0:?}")]
    UnknownMethod(Selector),

    /// The signature set does not satisfy the method's policy.
    #[error("invalid signatures: {0}")]
    InvalidSignatures(String),

    /// The nonce does not strictly increase.
    #[error(transparent)]
    NonceReplay(#[from] NonceReplayError),

    /// The wallet is already mid-call.
    #[error(transparent)]
    Reentrancy(#[from] LockError),

    /// The dispatch gateway refused the call.
    #[error(transparent)]
    Unauthorized(#[from] GatewayError),

    /// The wallet cannot cover the relayer's refund.
    #[error(transparent)]
    Refund(#[from] LedgerError),
}
