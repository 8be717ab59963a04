// Copyright (c) 2024 The Botho Foundation

//! End-to-end order lifecycles against in-memory chains.

use std::{sync::Arc, time::Duration};

use fusion_swap_core::{Chain, EscrowSide, Secret, Stage, U256};
use fusion_swap_resolver::{ErrorCategory, OrderStatus, Resolver, ResolverError, SwapGate};
use fusion_swap_test_utils::{
    fixture_order, fixture_unsigned_order, order_hasher, sign_fixture, FixedClock, MockCall,
    MockEscrowService, MockOp, EVM_RESOLVER_ADDRESS, FIXTURE_DEPLOYED_AT, TEZOS_RECEIVER,
    TEZOS_RESOLVER_ADDRESS,
};

struct Harness {
    ethereum: Arc<MockEscrowService>,
    tezos: Arc<MockEscrowService>,
    clock: Arc<FixedClock>,
    resolver: Resolver,
}

fn harness() -> Harness {
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

    Harness {
        ethereum,
        tezos,
        clock,
        resolver,
    }
}

fn secret() -> Secret {
    Secret::from_bytes([0x42; 32])
}

#[tokio::test]
async fn test_happy_path_ethereum_to_tezos() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    let order_hash = order.order_hash;

    let started = h.resolver.start_swap(order.clone()).await.unwrap();
    assert_eq!(
        started.src_escrow_address,
        h.ethereum.escrow_address(&order_hash, EscrowSide::Src)
    );
    assert_eq!(
        started.dst_escrow_address,
        h.tezos.escrow_address(&order_hash, EscrowSide::Dst)
    );
    assert!(started.dst_escrow_address.starts_with("KT1"));
    assert_eq!(
        h.resolver.order_status(order_hash).unwrap().status,
        OrderStatus::DstDeployed
    );

    // Destination immutables share the source anchor and hash-lock
    let dst_immutables = match &h.tezos.calls()[0] {
        MockCall::DeployDst { immutables } => immutables.clone(),
        other => panic!("unexpected call {:?}", other),
    };
    assert_eq!(dst_immutables.deployed_at, Some(FIXTURE_DEPLOYED_AT));
    assert_eq!(dst_immutables.hash_lock, order.order.hash_lock());
    assert_eq!(dst_immutables.maker, TEZOS_RECEIVER);
    assert_eq!(dst_immutables.taker, TEZOS_RESOLVER_ADDRESS);
    assert_eq!(dst_immutables.amount, U256::from(100_000_000u64));

    let finalized = h.resolver.finalize_swap(order_hash, &secret).await.unwrap();
    assert!(finalized.dst_withdrawal_tx.hash.contains("withdraw"));
    assert!(finalized.src_withdrawal_tx.hash.contains("withdraw"));
    assert_eq!(h.ethereum.count(MockOp::Withdraw), 1);
    assert_eq!(h.tezos.count(MockOp::Withdraw), 1);

    // Withdrawn orders leave the registry but stay queryable
    assert_eq!(h.resolver.active_orders(), 0);
    assert_eq!(
        h.resolver.order_status(order_hash).unwrap().status,
        OrderStatus::Withdrawn
    );
}

#[tokio::test]
async fn test_duplicate_order_is_rejected() {
    let h = harness();
    let order = fixture_order(&secret());

    h.resolver.start_swap(order.clone()).await.unwrap();
    let err = h.resolver.start_swap(order).await.unwrap_err();

    assert!(matches!(err, ResolverError::DuplicateOrder(_)));
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(h.ethereum.count(MockOp::DeploySrc), 1);
    assert_eq!(h.tezos.count(MockOp::DeployDst), 1);
}

#[tokio::test]
async fn test_completed_order_cannot_be_resubmitted() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);

    h.resolver.start_swap(order.clone()).await.unwrap();
    h.resolver
        .finalize_swap(order.order_hash, &secret)
        .await
        .unwrap();

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(err, ResolverError::DuplicateOrder(_)));
    assert_eq!(h.ethereum.count(MockOp::DeploySrc), 1);
}

#[tokio::test]
async fn test_wrong_secret_leaves_order_unchanged() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    let order_hash = order.order_hash;
    h.resolver.start_swap(order).await.unwrap();

    let err = h
        .resolver
        .finalize_swap(order_hash, &Secret::from_bytes([0x43; 32]))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::SecretMismatch(_)));
    assert_eq!(err.category().status_code(), 422);
    assert_eq!(h.tezos.count(MockOp::Withdraw), 0);
    assert_eq!(h.ethereum.count(MockOp::Withdraw), 0);
    assert_eq!(
        h.resolver.order_status(order_hash).unwrap().status,
        OrderStatus::DstDeployed
    );

    // The right secret still completes the swap
    h.resolver.finalize_swap(order_hash, &secret).await.unwrap();
}

#[tokio::test]
async fn test_order_hash_mismatch_makes_no_chain_calls() {
    let h = harness();
    let mut order = fixture_order(&secret());
    order.order.order_info.making_amount = U256::from(1u64);

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(err, ResolverError::OrderHashMismatch { .. }));
    assert!(h.ethereum.calls().is_empty());
    assert!(h.tezos.calls().is_empty());
    assert_eq!(h.resolver.active_orders(), 0);
}

#[tokio::test]
async fn test_signature_from_someone_else_is_rejected() {
    let h = harness();
    let mut unsigned = fixture_unsigned_order(&secret());
    unsigned.order_info.maker = "0x2222222222222222222222222222222222222222".to_string();
    let order = sign_fixture(unsigned);

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(err, ResolverError::InvalidSignature(_)));
    assert_eq!(err.category(), ErrorCategory::Integrity);
    assert!(h.ethereum.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_direction() {
    let h = harness();
    let mut unsigned = fixture_unsigned_order(&secret());
    unsigned.escrow_params.src_chain = Chain::TezosGhostnet;
    unsigned.escrow_params.dst_chain = Chain::Ethereum;
    unsigned.escrow_factory = "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh".to_string();
    unsigned.order_info.maker = TEZOS_RECEIVER.to_string();
    unsigned.order_info.maker_asset.address = "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh".to_string();
    unsigned.order_info.taker_asset.address =
        "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string();
    unsigned.order_info.receiver = Some("0x2222222222222222222222222222222222222222".to_string());
    let order = sign_fixture(unsigned);

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::UnsupportedDirection {
            src: Chain::TezosGhostnet,
            dst: Chain::Ethereum
        }
    ));
    assert_eq!(err.category().status_code(), 400);
    assert!(h.tezos.calls().is_empty());
}

#[tokio::test]
async fn test_destination_maker_must_be_destination_address() {
    let h = harness();
    let mut order = fixture_order(&secret());
    // The maker is an Ethereum account and cannot receive on Tezos
    order.order.order_info.receiver = None;

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(err, ResolverError::Validation(_)));
    assert_eq!(err.category().status_code(), 400);
    assert!(h.ethereum.calls().is_empty());
    assert!(h.tezos.calls().is_empty());
}

struct RejectAll;

impl SwapGate for RejectAll {
    fn can_swap(&self, _order: &fusion_swap_core::SignedCrossChainOrder) -> Result<(), String> {
        Err("no liquidity".to_string())
    }
}

#[tokio::test]
async fn test_gate_rejection_happens_before_deployment() {
    let h = harness();
    let resolver = h.resolver.with_gate(Arc::new(RejectAll));

    let err = resolver.start_swap(fixture_order(&secret())).await.unwrap_err();
    assert!(matches!(err, ResolverError::SwapRejected(reason) if reason == "no liquidity"));
    assert_eq!(h.ethereum.count(MockOp::DeploySrc), 0);
}

#[tokio::test]
async fn test_src_failure_registers_nothing() {
    let h = harness();
    h.ethereum.fail_on(MockOp::DeploySrc);
    let order = fixture_order(&secret());

    let err = h.resolver.start_swap(order.clone()).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Transaction);
    assert!(matches!(
        h.resolver.order_status(order.order_hash),
        Err(ResolverError::OrderNotFound(_))
    ));

    // Nothing was locked, so the order can be submitted again
    h.ethereum.clear_failure(MockOp::DeploySrc);
    h.resolver.start_swap(order).await.unwrap();
}

#[tokio::test]
async fn test_dst_failure_keeps_order_for_cancellation() {
    let h = harness();
    h.tezos.fail_on(MockOp::DeployDst);
    let order = fixture_order(&secret());
    let order_hash = order.order_hash;

    let err = h.resolver.start_swap(order).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::Chain {
            chain: Chain::TezosGhostnet,
            ..
        }
    ));

    let view = h.resolver.order_status(order_hash).unwrap();
    assert!(matches!(view.status, OrderStatus::Failed { .. }));
    assert!(view.src_escrow_address.is_some());
    assert!(view.dst_escrow_address.is_none());

    // Finalization needs a destination escrow
    let err = h
        .resolver
        .finalize_swap(order_hash, &secret())
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::InvalidTransition { .. }));

    // Only the source leg exists, cancellable once its window opens
    let err = h.resolver.cancel_swap(order_hash).await.unwrap_err();
    let src_opens = FIXTURE_DEPLOYED_AT + 121;
    assert!(matches!(
        err,
        ResolverError::CancellationPending { opens_at, .. } if opens_at == src_opens
    ));

    h.clock.set(src_opens);
    let cancelled = h.resolver.cancel_swap(order_hash).await.unwrap();
    assert!(cancelled.src_cancellation_tx.is_some());
    assert!(cancelled.dst_cancellation_tx.is_none());
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(h.tezos.count(MockOp::Cancel), 0);
}

#[tokio::test]
async fn test_cancel_windows_open_destination_first() {
    let h = harness();
    let order = fixture_order(&secret());
    let order_hash = order.order_hash;
    h.resolver.start_swap(order.clone()).await.unwrap();

    let time_locks = order.order.escrow_params.time_locks;
    let dst_opens = time_locks.deadline(FIXTURE_DEPLOYED_AT, Stage::DstCancellation);
    let src_opens = time_locks.deadline(FIXTURE_DEPLOYED_AT, Stage::SrcCancellation);
    assert!(dst_opens < src_opens);

    let err = h.resolver.cancel_swap(order_hash).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::CancellationPending { opens_at, .. } if opens_at == dst_opens
    ));
    assert_eq!(err.category().status_code(), 425);

    // Destination window open, source still locked
    h.clock.set(dst_opens);
    let first = h.resolver.cancel_swap(order_hash).await.unwrap();
    assert!(first.dst_cancellation_tx.is_some());
    assert!(first.src_cancellation_tx.is_none());
    assert_eq!(first.status, OrderStatus::DstDeployed);

    let err = h.resolver.cancel_swap(order_hash).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::CancellationPending { opens_at, .. } if opens_at == src_opens
    ));

    h.clock.set(src_opens);
    let second = h.resolver.cancel_swap(order_hash).await.unwrap();
    assert!(second.dst_cancellation_tx.is_none());
    assert!(second.src_cancellation_tx.is_some());
    assert_eq!(second.status, OrderStatus::Cancelled);

    assert_eq!(h.tezos.count(MockOp::Cancel), 1);
    assert_eq!(h.ethereum.count(MockOp::Cancel), 1);

    // Cancelled is terminal
    let err = h.resolver.cancel_swap(order_hash).await.unwrap_err();
    assert!(matches!(err, ResolverError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_finalize_after_partial_cancellation_fails() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    let order_hash = order.order_hash;
    h.resolver.start_swap(order.clone()).await.unwrap();

    let time_locks = order.order.escrow_params.time_locks;
    h.clock.set(time_locks.deadline(FIXTURE_DEPLOYED_AT, Stage::DstCancellation));
    let cancelled = h.resolver.cancel_swap(order_hash).await.unwrap();
    assert!(cancelled.dst_cancellation_tx.is_some());
    assert_eq!(cancelled.status, OrderStatus::DstDeployed);

    // The destination funds went back to the resolver
    let err = h
        .resolver
        .finalize_swap(order_hash, &secret)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolverError::InvalidTransition {
            to: OrderStatus::Withdrawn,
            ..
        }
    ));
    assert_eq!(err.category().status_code(), 409);
    assert_eq!(h.tezos.count(MockOp::Withdraw), 0);
    assert_eq!(h.ethereum.count(MockOp::Withdraw), 0);
}

#[tokio::test]
async fn test_cancelled_order_leaves_registry() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    h.resolver.start_swap(order.clone()).await.unwrap();

    h.clock.advance(10_000);
    h.resolver.cancel_swap(order.order_hash).await.unwrap();
    assert_eq!(h.resolver.active_orders(), 0);
    assert_eq!(h.resolver.completed_orders(), 1);
    assert_eq!(
        h.resolver.order_status(order.order_hash).unwrap().status,
        OrderStatus::Cancelled
    );

    let err = h
        .resolver
        .finalize_swap(order.order_hash, &secret)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolverError::InvalidTransition {
            from: OrderStatus::Cancelled,
            ..
        }
    ));
    assert_eq!(h.tezos.count(MockOp::Withdraw), 0);
}

#[tokio::test]
async fn test_completed_orders_are_bounded() {
    let h = harness();
    let resolver = h.resolver.with_completed_capacity(1);
    let first_secret = Secret::from_bytes([0x01; 32]);
    let second_secret = Secret::from_bytes([0x02; 32]);
    let first = fixture_order(&first_secret);
    let second = fixture_order(&second_secret);

    resolver.start_swap(first.clone()).await.unwrap();
    resolver
        .finalize_swap(first.order_hash, &first_secret)
        .await
        .unwrap();
    resolver.start_swap(second.clone()).await.unwrap();
    resolver
        .finalize_swap(second.order_hash, &second_secret)
        .await
        .unwrap();

    assert_eq!(resolver.completed_orders(), 1);
    assert!(matches!(
        resolver.order_status(first.order_hash),
        Err(ResolverError::OrderNotFound(_))
    ));
    assert_eq!(
        resolver.order_status(second.order_hash).unwrap().status,
        OrderStatus::Withdrawn
    );
}

#[tokio::test]
async fn test_cancel_after_both_windows_cancels_both_legs() {
    let h = harness();
    let order = fixture_order(&secret());
    h.resolver.start_swap(order.clone()).await.unwrap();

    h.clock.advance(10_000);
    let outcome = h.resolver.cancel_swap(order.order_hash).await.unwrap();
    assert!(outcome.dst_cancellation_tx.is_some());
    assert!(outcome.src_cancellation_tx.is_some());
    assert_eq!(outcome.status, OrderStatus::Cancelled);
    assert!(matches!(h.tezos.calls().last(), Some(MockCall::Cancel { .. })));
    assert!(matches!(h.ethereum.calls().last(), Some(MockCall::Cancel { .. })));
}

#[tokio::test]
async fn test_cancel_after_withdrawal_fails() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    h.resolver.start_swap(order.clone()).await.unwrap();
    h.resolver
        .finalize_swap(order.order_hash, &secret)
        .await
        .unwrap();

    h.clock.advance(10_000);
    let err = h.resolver.cancel_swap(order.order_hash).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::InvalidTransition {
            from: OrderStatus::Withdrawn,
            ..
        }
    ));
    assert_eq!(h.ethereum.count(MockOp::Cancel), 0);
}

#[tokio::test]
async fn test_partial_withdrawal_is_resumed() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    let order_hash = order.order_hash;
    h.resolver.start_swap(order).await.unwrap();

    h.ethereum.fail_on(MockOp::Withdraw);
    let err = h
        .resolver
        .finalize_swap(order_hash, &secret)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ResolverError::Chain {
            chain: Chain::Ethereum,
            operation: "withdraw",
            ..
        }
    ));
    assert!(matches!(
        h.resolver.order_status(order_hash).unwrap().status,
        OrderStatus::Failed { .. }
    ));

    h.ethereum.clear_failure(MockOp::Withdraw);
    h.resolver.finalize_swap(order_hash, &secret).await.unwrap();

    // The destination leg is not withdrawn twice
    assert_eq!(h.tezos.count(MockOp::Withdraw), 1);
    assert_eq!(h.ethereum.count(MockOp::Withdraw), 1);
    assert_eq!(
        h.resolver.order_status(order_hash).unwrap().status,
        OrderStatus::Withdrawn
    );
}

#[tokio::test]
async fn test_unknown_order() {
    let h = harness();
    let order_hash = fixture_order(&secret()).order_hash;

    assert!(matches!(
        h.resolver.cancel_swap(order_hash).await,
        Err(ResolverError::OrderNotFound(_))
    ));
    let err = h
        .resolver
        .finalize_swap(order_hash, &secret())
        .await
        .unwrap_err();
    assert_eq!(err.category().status_code(), 404);
}

#[tokio::test(start_paused = true)]
async fn test_slow_confirmation_times_out() {
    let h = harness();
    h.tezos.delay_on(MockOp::DeployDst, Duration::from_secs(600));
    let resolver = h
        .resolver
        .with_timeout(Chain::TezosGhostnet, Duration::from_secs(30));
    let order = fixture_order(&secret());

    let err = resolver.start_swap(order.clone()).await.unwrap_err();
    assert!(matches!(
        err,
        ResolverError::Timeout {
            chain: Chain::TezosGhostnet,
            operation: "deploy dst",
            ..
        }
    ));
    assert_eq!(err.category().status_code(), 504);
    assert!(matches!(
        resolver.order_status(order.order_hash).unwrap().status,
        OrderStatus::Failed { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_request_for_busy_order() {
    let h = harness();
    let secret = secret();
    let order = fixture_order(&secret);
    let order_hash = order.order_hash;
    h.resolver.start_swap(order).await.unwrap();

    h.tezos.delay_on(MockOp::Withdraw, Duration::from_secs(5));
    let resolver = Arc::new(h.resolver);

    let finalizing = {
        let resolver = resolver.clone();
        let secret = secret.clone();
        tokio::spawn(async move { resolver.finalize_swap(order_hash, &secret).await })
    };
    tokio::time::sleep(Duration::from_secs(1)).await;

    let err = resolver.cancel_swap(order_hash).await.unwrap_err();
    assert!(matches!(err, ResolverError::OrderBusy(_)));

    finalizing.await.unwrap().unwrap();
    assert_eq!(
        resolver.order_status(order_hash).unwrap().status,
        OrderStatus::Withdrawn
    );
}
