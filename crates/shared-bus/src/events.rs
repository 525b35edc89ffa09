//! # Wallet Events
//!
//! Observable state transitions of the wallet platform. Every successful
//! mutation in a subsystem publishes exactly one of these to the bus.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Bytes, Hash, VersionId, U256};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WalletEvent {
    // =========================================================================
    // SUBSYSTEM 1: STORAGE AUTHORITY
    // =========================================================================
    /// A storage was added to the platform-wide write whitelist.
    StorageAdded {
        /// Address of the newly authorized storage.
        storage: Address,
    },

    // =========================================================================
    // SUBSYSTEM 2: VERSION REGISTRY
    // =========================================================================
    /// A new feature bundle was published.
    VersionAdded {
        /// Identifier of the new version.
        version_id: VersionId,
        /// The bundled feature addresses, in registration order.
        features: Vec<Address>,
        /// 4-byte digest of the sorted feature set.
        fingerprint: [u8; 4],
    },

    /// The minimum upgradeable version was raised.
    MinVersionChanged {
        /// New watermark; upgrades below it are rejected from now on.
        min_version: VersionId,
    },

    /// A wallet moved to a new version.
    WalletUpgraded {
        /// The upgraded wallet.
        wallet: Address,
        /// The version it now runs.
        version_id: VersionId,
    },

    // =========================================================================
    // SUBSYSTEM 4: RELAY ENGINE
    // =========================================================================
    /// A relayed call completed. `success` reports the inner feature call;
    /// the relay itself committed either way.
    TransactionExecuted {
        /// Wallet the call ran against.
        wallet: Address,
        /// Outcome of the inner feature call.
        success: bool,
        /// Raw return or error bytes of the inner call.
        return_data: Bytes,
        /// Digest the signers authorized.
        signed_hash: Hash,
    },

    /// The relayer's gas cost was reimbursed from the wallet.
    Refunded {
        /// Wallet that paid.
        wallet: Address,
        /// Recipient of the refund.
        refund_address: Address,
        /// Token the refund was paid in (native-asset sentinel included).
        refund_token: Address,
        /// Amount transferred.
        amount: U256,
    },
}

impl WalletEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::StorageAdded { .. } => EventTopic::StorageAuthority,
            Self::VersionAdded { .. }
            | Self::MinVersionChanged { .. }
            | Self::WalletUpgraded { .. } => EventTopic::VersionRegistry,
            Self::TransactionExecuted { .. } | Self::Refunded { .. } => EventTopic::RelayEngine,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::StorageAdded { .. } => 1,
            Self::VersionAdded { .. }
            | Self::MinVersionChanged { .. }
            | Self::WalletUpgraded { .. } => 2,
            Self::TransactionExecuted { .. } | Self::Refunded { .. } => 4,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 1 events.
    StorageAuthority,
    /// Subsystem 2 events.
    VersionRegistry,
    /// Subsystem 4 events.
    RelayEngine,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &WalletEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
