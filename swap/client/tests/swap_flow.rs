// Copyright (c) 2024 The Botho Foundation

//! Maker client against a live resolver API backed by in-memory chains.

use std::sync::Arc;

use async_trait::async_trait;
use fusion_swap_client::{
    config::{EthereumClientConfig, TezosClientConfig},
    AssetDescriptor, ClientConfig, ClientError, ResolverClient, SwapManager,
};
use fusion_swap_core::{BlockClock, Chain, Secret, SwapError, SwapRequest};
use fusion_swap_resolver::{api, Resolver};
use fusion_swap_test_utils::{
    maker_signer, order_hasher, FixedClock, MockEscrowService, MockOp, EVM_ESCROW_FACTORY,
    EVM_RESOLVER_ADDRESS, FIXTURE_AUCTION_START, FIXTURE_DEPLOYED_AT, TEZOS_RECEIVER,
    TEZOS_RESOLVER_ADDRESS,
};

struct StaticBlockClock(u64);

#[async_trait]
impl BlockClock for StaticBlockClock {
    async fn latest_block_timestamp(&self) -> Result<u64, SwapError> {
        Ok(self.0)
    }
}

struct Harness {
    manager: SwapManager,
    ethereum: Arc<MockEscrowService>,
    tezos: Arc<MockEscrowService>,
    clock: Arc<FixedClock>,
}

async fn harness() -> Harness {
    let ethereum = Arc::new(MockEscrowService::new(Chain::Ethereum, EVM_RESOLVER_ADDRESS));
    let tezos = Arc::new(MockEscrowService::new(
        Chain::TezosGhostnet,
        TEZOS_RESOLVER_ADDRESS,
    ));
    let clock = Arc::new(FixedClock::new(FIXTURE_DEPLOYED_AT));

    let resolver = Resolver::new(Arc::new(order_hasher()), clock.clone())
        .with_service(ethereum.clone())
        .with_service(tezos.clone())
        .with_route(Chain::Ethereum, Chain::TezosGhostnet);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(Arc::new(resolver)))
            .await
            .unwrap();
    });

    let config = ClientConfig {
        resolver_url: format!("http://{}", addr),
        ethereum: EthereumClientConfig {
            escrow_factory: EVM_ESCROW_FACTORY.to_string(),
            ..Default::default()
        },
        tezos: TezosClientConfig {
            resolver_address: TEZOS_RESOLVER_ADDRESS.to_string(),
            receiver: Some(TEZOS_RECEIVER.to_string()),
        },
        ..Default::default()
    };
    let manager = SwapManager::from_config(
        &config,
        Arc::new(maker_signer()),
        Arc::new(StaticBlockClock(FIXTURE_AUCTION_START)),
    )
    .unwrap();

    Harness {
        manager,
        ethereum,
        tezos,
        clock,
    }
}

fn request(src: &str, src_amount: &str, dst: &str, dst_amount: &str) -> SwapRequest {
    let src: AssetDescriptor = src.parse().unwrap();
    let dst: AssetDescriptor = dst.parse().unwrap();
    SwapRequest {
        src_chain: src.chain,
        src_token: src.token,
        src_amount: src_amount.to_string(),
        dst_chain: dst.chain,
        dst_token: dst.token,
        dst_amount: dst_amount.to_string(),
        receiver: Some(TEZOS_RECEIVER.to_string()),
    }
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;
    let health = h.manager.resolver().health().await.unwrap();
    assert_eq!(health.message, "OK");
}

#[tokio::test]
async fn test_swap_and_withdraw() {
    let h = harness().await;
    let receipt = h
        .manager
        .swap(&request("eth:USDC", "100", "tezos:USDT", "100"))
        .await
        .unwrap();

    assert_ne!(
        receipt.deployment.src_escrow_address,
        receipt.deployment.dst_escrow_address
    );
    assert!(!receipt.deployment.src_escrow_address.is_empty());
    assert_eq!(h.ethereum.count(MockOp::DeploySrc), 1);
    assert_eq!(h.tezos.count(MockOp::DeployDst), 1);

    let status = h.manager.status(&receipt.order_hash).await.unwrap();
    assert_eq!(status.status, "dst_deployed");

    let finalized = h
        .manager
        .withdraw(&receipt.order_hash, &receipt.secret)
        .await
        .unwrap();
    assert!(!finalized.src_withdrawal_tx.hash.is_empty());
    assert!(!finalized.dst_withdrawal_tx.hash.is_empty());

    let status = h.manager.status(&receipt.order_hash).await.unwrap();
    assert_eq!(status.status, "withdrawn");
}

#[tokio::test]
async fn test_wrong_secret_is_rejected() {
    let h = harness().await;
    let receipt = h
        .manager
        .swap(&request("eth:USDC", "1.5", "xtz:USDT", "1.5"))
        .await
        .unwrap();

    let err = h
        .manager
        .withdraw(&receipt.order_hash, &Secret::from_bytes([1u8; 32]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert_eq!(h.tezos.count(MockOp::Withdraw), 0);

    let status = h.manager.status(&receipt.order_hash).await.unwrap();
    assert_eq!(status.status, "dst_deployed");
}

#[tokio::test]
async fn test_cancel_after_windows_open() {
    let h = harness().await;
    let receipt = h
        .manager
        .swap(&request("eth:USDC", "100", "tezos:USDT", "100"))
        .await
        .unwrap();

    let err = h.manager.cancel(&receipt.order_hash).await.unwrap_err();
    assert_eq!(err.status(), Some(425));

    h.clock.advance(3_600);
    let cancelled = h.manager.cancel(&receipt.order_hash).await.unwrap();
    assert!(cancelled.src_cancellation_tx.is_some());
    assert!(cancelled.dst_cancellation_tx.is_some());
}

#[tokio::test]
async fn test_chain_failure_surfaces_resolver_error() {
    let h = harness().await;
    h.tezos.fail_on(MockOp::DeployDst);

    let err = h
        .manager
        .swap(&request("eth:USDC", "100", "tezos:USDT", "100"))
        .await
        .unwrap_err();
    match err {
        ClientError::Resolver { status, message } => {
            assert_eq!(status, 502);
            assert!(message.contains("deploy dst"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_unknown_token_fails_before_submission() {
    let h = harness().await;
    let err = h
        .manager
        .swap(&request("eth:DOGE", "100", "tezos:USDT", "100"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Swap(SwapError::TokenNotFound { .. })));
    assert_eq!(h.ethereum.count(MockOp::DeploySrc), 0);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let h = harness().await;
    let client = ResolverClient::new(h.manager.resolver().base_url()).unwrap();
    let err = client
        .status(&fusion_swap_core::B256::repeat_byte(0xab))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}
