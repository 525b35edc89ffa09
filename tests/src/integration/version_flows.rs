//! # Version Lifecycle Flows
//!
//! Cross-subsystem tests: storage authority and version registry feeding the
//! dispatch gateway, with the event bus observing every transition.

#[cfg(test)]
mod tests {
    use crate::fixtures::{keypair, platform, KvStorage, TestFeature, PLATFORM_OWNER};
    use shared_bus::{EventFilter, EventTopic, WalletEvent};
    use shared_types::Address;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[tokio::test]
    async fn test_version_lifecycle_and_dispatch_authority() {
        let p = platform();
        let (_, owner) = keypair();
        p.add_wallet(addr(0x01), owner).await;

        let storage = Arc::new(KvStorage::new(addr(0x51)));
        p.storages.insert(storage);
        p.authority
            .add_storage(PLATFORM_OWNER, addr(0x51))
            .await
            .unwrap();

        let f1 = Arc::new(TestFeature::new(addr(0x11), addr(0x51)));
        let f2 = Arc::new(TestFeature::new(addr(0x12), addr(0x51)));
        p.add_feature(f1);
        p.add_feature(f2);

        // Publish [F1, F2] with F2 in the init set, then upgrade.
        let id = p
            .registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11), addr(0x12)], vec![addr(0x12)])
            .await
            .unwrap();
        assert_eq!(id, 1);
        p.registry
            .upgrade_wallet(owner, addr(0x01), 1)
            .await
            .unwrap();

        // Both bundled features are authorized, an unregistered one is not.
        assert!(p.gateway.can_invoke(addr(0x01), addr(0x11), None).await);
        assert!(p.gateway.can_invoke(addr(0x01), addr(0x12), None).await);
        assert!(!p.gateway.can_invoke(addr(0x01), addr(0x13), None).await);

        // Whitelisted storage passes, an unknown one does not.
        assert!(
            p.gateway
                .can_invoke(addr(0x01), addr(0x11), Some(addr(0x51)))
                .await
        );
        assert!(
            !p.gateway
                .can_invoke(addr(0x01), addr(0x11), Some(addr(0x52)))
                .await
        );
    }

    #[tokio::test]
    async fn test_upgrade_revokes_old_features_immediately() {
        let p = platform();
        let (_, owner) = keypair();
        p.add_wallet(addr(0x01), owner).await;

        let f1 = Arc::new(TestFeature::new(addr(0x11), addr(0x51)));
        let f2 = Arc::new(TestFeature::new(addr(0x12), addr(0x51)));
        p.add_feature(f1);
        p.add_feature(f2);

        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11)], vec![])
            .await
            .unwrap();
        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x12)], vec![])
            .await
            .unwrap();

        p.registry
            .upgrade_wallet(owner, addr(0x01), 1)
            .await
            .unwrap();
        assert!(p.gateway.can_invoke(addr(0x01), addr(0x11), None).await);

        p.registry
            .upgrade_wallet(owner, addr(0x01), 2)
            .await
            .unwrap();

        // The old feature's authority vanished with the upgrade, no separate
        // revocation step.
        assert!(!p.gateway.can_invoke(addr(0x01), addr(0x11), None).await);
        assert!(p.gateway.can_invoke(addr(0x01), addr(0x12), None).await);
    }

    #[tokio::test]
    async fn test_min_version_gates_upgrades_not_wallets() {
        let p = platform();
        let (_, owner_a) = keypair();
        let (_, owner_b) = keypair();
        p.add_wallet(addr(0x01), owner_a).await;
        p.add_wallet(addr(0x02), owner_b).await;

        let f1 = Arc::new(TestFeature::new(addr(0x11), addr(0x51)));
        p.add_feature(f1);

        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11)], vec![])
            .await
            .unwrap();
        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11)], vec![])
            .await
            .unwrap();

        // Wallet A reaches version 1 before the watermark moves.
        p.registry
            .upgrade_wallet(owner_a, addr(0x01), 1)
            .await
            .unwrap();

        p.registry
            .set_min_version(PLATFORM_OWNER, 2)
            .await
            .unwrap();

        // Wallet B (still on 0) can no longer take version 1 even though it
        // exists.
        let result = p.registry.upgrade_wallet(owner_b, addr(0x02), 1).await;
        assert!(matches!(
            result,
            Err(mw_02_version_registry::VersionError::BelowMinVersion { requested: 1, min: 2 })
        ));

        // Wallet A keeps functioning below the watermark.
        assert!(p.gateway.can_invoke(addr(0x01), addr(0x11), None).await);
        // And can still move up.
        p.registry
            .upgrade_wallet(owner_a, addr(0x01), 2)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fingerprints_identify_equal_bundles() {
        let p = platform();

        let f1 = Arc::new(TestFeature::new(addr(0x11), addr(0x51)));
        let f2 = Arc::new(TestFeature::new(addr(0x12), addr(0x51)));
        p.add_feature(f1);
        p.add_feature(f2);

        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11), addr(0x12)], vec![])
            .await
            .unwrap();
        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x12), addr(0x11)], vec![])
            .await
            .unwrap();
        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11)], vec![])
            .await
            .unwrap();

        let v1 = p.registry.version(1).await.unwrap();
        let v2 = p.registry.version(2).await.unwrap();
        let v3 = p.registry.version(3).await.unwrap();

        // Same set in different registration order: same fingerprint.
        assert_eq!(v1.fingerprint, v2.fingerprint);
        assert_ne!(v1.fingerprint, v3.fingerprint);
    }

    #[tokio::test]
    async fn test_registry_events_observable() {
        let p = platform();
        let (_, owner) = keypair();
        p.add_wallet(addr(0x01), owner).await;

        let f1 = Arc::new(TestFeature::new(addr(0x11), addr(0x51)));
        p.add_feature(f1);

        let mut sub = p
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::VersionRegistry]));

        p.registry
            .add_version(PLATFORM_OWNER, vec![addr(0x11)], vec![])
            .await
            .unwrap();
        p.registry
            .upgrade_wallet(owner, addr(0x01), 1)
            .await
            .unwrap();

        let added = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        match added {
            WalletEvent::VersionAdded {
                version_id,
                features,
                ..
            } => {
                assert_eq!(version_id, 1);
                assert_eq!(features, vec![addr(0x11)]);
            }
            other => panic!("expected VersionAdded, got {other:?}"),
        }

        let upgraded = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(
            upgraded,
            WalletEvent::WalletUpgraded { wallet, version_id: 1 } if wallet == addr(0x01)
        ));
    }

    #[tokio::test]
    async fn test_storage_authority_events_and_duplicates() {
        let p = platform();

        let mut sub = p
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::StorageAuthority]));

        p.authority
            .add_storage(PLATFORM_OWNER, addr(0x51))
            .await
            .unwrap();
        assert!(matches!(
            p.authority.add_storage(PLATFORM_OWNER, addr(0x51)).await,
            Err(mw_01_storage_authority::StorageAuthorityError::StorageAlreadyAdded(_))
        ));

        // Exactly one event for the one successful add.
        let event = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert!(matches!(
            event,
            WalletEvent::StorageAdded { storage } if storage == addr(0x51)
        ));
        assert!(sub.try_recv().unwrap().is_none());
    }
}
