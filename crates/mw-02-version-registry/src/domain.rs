//! # Version Domain
//!
//! A version is an immutable, append-only bundle of features. Published
//! versions are never mutated or destroyed; wallets that stay behind keep
//! resolving to the exact bundle they were audited against.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::{Address, VersionId};
use std::collections::HashSet;

/// An immutable feature bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Identifier, assigned sequentially from 1.
    pub id: VersionId,
    /// Bundled features, in registration order.
    pub features: Vec<Address>,
    /// Same features as a set, for O(1) membership checks.
    pub feature_set: HashSet<Address>,
    /// Subset of `features` whose init hook runs when a wallet upgrades in.
    pub features_to_init: Vec<Address>,
    /// 4-byte digest of the sorted feature set.
    pub fingerprint: [u8; 4],
}

impl Version {
    /// Builds a version, computing the membership set and fingerprint.
    #[must_use]
    pub fn new(id: VersionId, features: Vec<Address>, features_to_init: Vec<Address>) -> Self {
        let feature_set = features.iter().copied().collect();
        let fingerprint = fingerprint(&features);
        Self {
            id,
            features,
            feature_set,
            features_to_init,
            fingerprint,
        }
    }

    /// Whether the feature belongs to this bundle.
    #[must_use]
    pub fn contains(&self, feature: Address) -> bool {
        self.feature_set.contains(&feature)
    }
}

/// Computes the 4-byte fingerprint of a feature set.
///
/// Addresses are sorted high-to-low before hashing so that equal sets map to
/// equal fingerprints regardless of registration order; the digest is the
/// leading 4 bytes of the Keccak-256 of the concatenation.
#[must_use]
pub fn fingerprint(features: &[Address]) -> [u8; 4] {
    let mut sorted: Vec<Address> = features.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut concat = Vec::with_capacity(sorted.len() * 20);
    for feature in &sorted {
        concat.extend_from_slice(feature.as_bytes());
    }

    let digest = Keccak256::digest(&concat);
    let mut fp = [0u8; 4];
    fp.copy_from_slice(&digest[..4]);
    fp
}
