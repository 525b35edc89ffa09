//! # Relay Flows
//!
//! End-to-end relayed execution through the real dispatch gateway, with
//! refunds settled on the ledger and events observed on the bus.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        keypair, platform, relay_request, sign_request, KvStorage, Platform, TestFeature, FAIL,
        GUARDED, PING, PLATFORM_OWNER, RELAYER, WRITE,
    };
    use k256::ecdsa::SigningKey;
    use mw_04_relay_engine::{BalanceLedger, RelayError};
    use shared_bus::{EventFilter, EventTopic, WalletEvent};
    use shared_types::{Address, Bytes, RelayNonce, WalletDirectory, NATIVE_TOKEN, U256};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const WALLET: Address = Address([0x01; 20]);
    const FEATURE: Address = Address([0x11; 20]);
    const STORAGE: Address = Address([0x51; 20]);

    /// Platform with one wallet on version 1 = [TestFeature], whitelisted
    /// storage, and the owner's signing key.
    async fn relay_platform() -> (Platform, SigningKey, Arc<KvStorage>) {
        let p = platform();
        let (owner_key, owner) = keypair();
        p.add_wallet(WALLET, owner).await;

        let storage = Arc::new(KvStorage::new(STORAGE));
        p.storages.insert(storage.clone());
        p.authority
            .add_storage(PLATFORM_OWNER, STORAGE)
            .await
            .unwrap();

        let feature = Arc::new(TestFeature::new(FEATURE, STORAGE));
        feature.attach_gateway(p.gateway.clone());
        p.add_feature(feature);

        p.registry
            .add_version(PLATFORM_OWNER, vec![FEATURE], vec![FEATURE])
            .await
            .unwrap();
        p.registry.upgrade_wallet(owner, WALLET, 1).await.unwrap();

        (p, owner_key, storage)
    }

    #[tokio::test]
    async fn test_end_to_end_relay_with_events() {
        let (p, owner_key, _) = relay_platform().await;

        let mut sub = p
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::RelayEngine]));

        let req = sign_request(
            relay_request(WALLET, FEATURE, PING, RelayNonce::compose(1, 1)),
            p.chain_id(),
            &[&owner_key],
        );
        let receipt = p.engine.execute(RELAYER, req).await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.return_data, Bytes::from_slice(b"pong"));

        // Refund event first (paid during the call), then the execution event.
        let refunded = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        match refunded {
            WalletEvent::Refunded {
                wallet,
                refund_address,
                refund_token,
                amount,
            } => {
                assert_eq!(wallet, WALLET);
                assert_eq!(refund_address, RELAYER);
                assert_eq!(refund_token, NATIVE_TOKEN);
                assert_eq!(Some(amount), receipt.refund);
            }
            other => panic!("expected Refunded, got {other:?}"),
        }

        let executed = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        match executed {
            WalletEvent::TransactionExecuted {
                wallet,
                success,
                signed_hash,
                ..
            } => {
                assert_eq!(wallet, WALLET);
                assert!(success);
                assert_eq!(signed_hash, receipt.signed_hash);
            }
            other => panic!("expected TransactionExecuted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_relayed_storage_write_lands() {
        let (p, owner_key, storage) = relay_platform().await;

        let mut req = relay_request(WALLET, FEATURE, WRITE, RelayNonce::compose(1, 1));
        let mut data = WRITE.as_bytes().to_vec();
        data.extend_from_slice(b"limit=500");
        req.data = Bytes::from_vec(data);
        let req = sign_request(req, p.chain_id(), &[&owner_key]);

        let receipt = p.engine.execute(RELAYER, req).await.unwrap();
        assert!(receipt.success);
        assert_eq!(storage.last_write(WALLET), Some(Bytes::from_slice(b"limit=500")));
    }

    #[tokio::test]
    async fn test_unauthorized_storage_is_recovered_inner_failure() {
        let (p, owner_key, _) = relay_platform().await;

        // A second feature wired to a storage that never got whitelisted.
        let rogue_feature = Address::new([0x12; 20]);
        let rogue_storage = Address::new([0x52; 20]);
        p.storages.insert(Arc::new(KvStorage::new(rogue_storage)));
        let feature = Arc::new(TestFeature::new(rogue_feature, rogue_storage));
        feature.attach_gateway(p.gateway.clone());
        p.add_feature(feature);

        p.registry
            .add_version(PLATFORM_OWNER, vec![FEATURE, rogue_feature], vec![])
            .await
            .unwrap();
        let owner = p.wallets.wallet(WALLET).unwrap().owner();
        p.registry.upgrade_wallet(owner, WALLET, 2).await.unwrap();

        let nonce = RelayNonce::compose(2, 1);
        let req = sign_request(
            relay_request(WALLET, rogue_feature, WRITE, nonce),
            p.chain_id(),
            &[&owner_key],
        );
        let receipt = p.engine.execute(RELAYER, req).await.unwrap();

        // The storage check failed inside the feature: the relay committed,
        // the action did not.
        assert!(!receipt.success);
        let reason = String::from_utf8(receipt.return_data.into_vec()).unwrap();
        assert!(reason.contains("invalid storage"), "got: {reason}");

        // Nonce consumed, refund paid regardless.
        assert_eq!(p.engine.relay_nonce(WALLET).await, nonce);
        assert!(receipt.refund.is_some());
    }

    #[tokio::test]
    async fn test_feature_outside_wallet_version_aborts_relay() {
        let (p, owner_key, _) = relay_platform().await;

        // Registered and resolvable, but never bundled into the wallet's
        // version.
        let outside = Address::new([0x13; 20]);
        let feature = Arc::new(TestFeature::new(outside, STORAGE));
        feature.attach_gateway(p.gateway.clone());
        p.add_feature(feature);

        let req = sign_request(
            relay_request(WALLET, outside, PING, RelayNonce::compose(1, 1)),
            p.chain_id(),
            &[&owner_key],
        );
        let result = p.engine.execute(RELAYER, req).await;

        assert!(matches!(result, Err(RelayError::Unauthorized(_))));
        // Whole call aborted: no nonce, no refund.
        assert_eq!(p.engine.relay_nonce(WALLET).await, RelayNonce::ZERO);
        assert_eq!(p.ledger.balance(RELAYER, NATIVE_TOKEN).await, U256::zero());
    }

    #[tokio::test]
    async fn test_refund_invariant_success_and_failure() {
        let (p, owner_key, _) = relay_platform().await;

        for (i, selector) in [PING, FAIL].into_iter().enumerate() {
            let before = p.ledger.balance(WALLET, NATIVE_TOKEN).await;
            let req = sign_request(
                relay_request(WALLET, FEATURE, selector, RelayNonce::compose(i as u64 + 1, 1)),
                p.chain_id(),
                &[&owner_key],
            );
            let receipt = p.engine.execute(RELAYER, req).await.unwrap();
            let after = p.ledger.balance(WALLET, NATIVE_TOKEN).await;

            let refund = receipt.refund.unwrap();
            assert!(refund > U256::zero());
            assert_eq!(before - after, refund);
        }
    }

    #[tokio::test]
    async fn test_guardian_cosigned_relay() {
        let (p, owner_key, _) = relay_platform().await;
        let (guardian_key, guardian) = keypair();
        p.guardians.add_guardian(WALLET, guardian);

        let req = sign_request(
            relay_request(WALLET, FEATURE, GUARDED, RelayNonce::compose(1, 1)),
            p.chain_id(),
            &[&owner_key, &guardian_key],
        );
        let receipt = p.engine.execute(RELAYER, req).await.unwrap();

        assert!(receipt.success);
        assert_eq!(receipt.return_data, Bytes::from_slice(b"guarded"));
    }

    #[tokio::test]
    async fn test_guardian_signature_without_membership_rejected() {
        let (p, owner_key, _) = relay_platform().await;
        let (stranger_key, _) = keypair();

        let req = sign_request(
            relay_request(WALLET, FEATURE, GUARDED, RelayNonce::compose(1, 1)),
            p.chain_id(),
            &[&owner_key, &stranger_key],
        );
        let result = p.engine.execute(RELAYER, req).await;

        assert!(matches!(result, Err(RelayError::InvalidSignatures(_))));
        assert_eq!(p.engine.relay_nonce(WALLET).await, RelayNonce::ZERO);
    }

    #[tokio::test]
    async fn test_composite_nonces_strictly_order_resubmissions() {
        let (p, owner_key, _) = relay_platform().await;

        // Same block, later timestamp.
        let first = RelayNonce::compose(100, 5_000);
        let second = RelayNonce::compose(100, 5_001);
        // Later block, earlier timestamp.
        let third = RelayNonce::compose(101, 0);

        for nonce in [first, second, third] {
            let req = sign_request(
                relay_request(WALLET, FEATURE, PING, nonce),
                p.chain_id(),
                &[&owner_key],
            );
            assert!(p.engine.execute(RELAYER, req).await.is_ok());
        }

        // Anything at or below the high-water mark replays.
        let replay = sign_request(
            relay_request(WALLET, FEATURE, PING, second),
            p.chain_id(),
            &[&owner_key],
        );
        assert!(matches!(
            p.engine.execute(RELAYER, replay).await,
            Err(RelayError::NonceReplay(_))
        ));
    }
}
