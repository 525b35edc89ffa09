//! # Reentrancy Flows
//!
//! A feature that re-enters the platform mid-execution must hit the shared
//! per-wallet lock, whichever entry point it comes back through.

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        keypair, platform, relay_request, sign_request, MaliciousFeature, Platform, TestFeature,
        PING, PLATFORM_OWNER, REENTER_RELAY, REENTER_UPGRADE, RELAYER,
    };
    use k256::ecdsa::SigningKey;
    use shared_types::{Address, RelayNonce, WalletDirectory};
    use std::sync::Arc;

    const WALLET: Address = Address([0x01; 20]);
    const HONEST: Address = Address([0x11; 20]);
    const MALICIOUS: Address = Address([0x21; 20]);
    const STORAGE: Address = Address([0x51; 20]);

    /// Platform with a wallet running [honest, malicious] as version 2,
    /// version 1 = [honest] left as an upgrade target for the attack.
    async fn attack_platform() -> (Platform, SigningKey, Arc<MaliciousFeature>) {
        let p = platform();
        let (owner_key, owner) = keypair();
        p.add_wallet(WALLET, owner).await;

        let honest = Arc::new(TestFeature::new(HONEST, STORAGE));
        honest.attach_gateway(p.gateway.clone());
        p.add_feature(honest);

        let malicious = Arc::new(MaliciousFeature::new(MALICIOUS));
        malicious.attach_engine(p.engine.clone());
        malicious.attach_registry(p.registry.clone());
        p.add_feature(malicious.clone());

        p.registry
            .add_version(PLATFORM_OWNER, vec![HONEST], vec![])
            .await
            .unwrap();
        p.registry
            .add_version(PLATFORM_OWNER, vec![HONEST, MALICIOUS], vec![])
            .await
            .unwrap();
        p.registry.upgrade_wallet(owner, WALLET, 2).await.unwrap();

        (p, owner_key, malicious)
    }

    #[tokio::test]
    async fn test_nested_upgrade_blocked_by_wallet_lock() {
        let (p, owner_key, _) = attack_platform().await;

        let req = sign_request(
            relay_request(WALLET, MALICIOUS, REENTER_UPGRADE, RelayNonce::compose(3, 1)),
            p.chain_id(),
            &[&owner_key],
        );
        let receipt = p.engine.execute(RELAYER, req).await.unwrap();

        // The nested upgrade failed inside the feature; the relay itself
        // committed with success = false.
        assert!(!receipt.success);
        let reason = String::from_utf8(receipt.return_data.into_vec()).unwrap();
        assert!(reason.contains("reentrant"), "got: {reason}");

        // The wallet never moved off its version.
        let wallet = p.wallets.wallet(WALLET).unwrap();
        assert_eq!(wallet.current_version(), 2);
    }

    #[tokio::test]
    async fn test_nested_relay_blocked_by_wallet_lock() {
        let (p, owner_key, malicious) = attack_platform().await;

        // A perfectly valid signed message, planted for the feature to relay
        // from inside its own execution.
        let inner_nonce = RelayNonce::compose(4, 1);
        let inner = sign_request(
            relay_request(WALLET, HONEST, PING, inner_nonce),
            p.chain_id(),
            &[&owner_key],
        );
        malicious.plant_inner_request(inner);

        let outer_nonce = RelayNonce::compose(3, 1);
        let outer = sign_request(
            relay_request(WALLET, MALICIOUS, REENTER_RELAY, outer_nonce),
            p.chain_id(),
            &[&owner_key],
        );
        let receipt = p.engine.execute(RELAYER, outer).await.unwrap();

        assert!(!receipt.success);
        let reason = String::from_utf8(receipt.return_data.into_vec()).unwrap();
        assert!(reason.contains("reentrant"), "got: {reason}");

        // Only the outer nonce is consumed; the inner message's nonce was
        // rolled back with the nested abort and stays usable.
        assert_eq!(p.engine.relay_nonce(WALLET).await, outer_nonce);
        let retry = sign_request(
            relay_request(WALLET, HONEST, PING, inner_nonce),
            p.chain_id(),
            &[&owner_key],
        );
        assert!(p.engine.execute(RELAYER, retry).await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_released_after_attack() {
        let (p, owner_key, _) = attack_platform().await;

        let req = sign_request(
            relay_request(WALLET, MALICIOUS, REENTER_UPGRADE, RelayNonce::compose(3, 1)),
            p.chain_id(),
            &[&owner_key],
        );
        p.engine.execute(RELAYER, req).await.unwrap();

        // The wallet is idle again: direct calls proceed normally.
        assert!(!p.locks.is_held(WALLET));
        let owner = p.wallets.wallet(WALLET).unwrap().owner();
        p.registry.upgrade_wallet(owner, WALLET, 1).await.unwrap();
        assert_eq!(p.wallets.wallet(WALLET).unwrap().current_version(), 1);
    }
}
