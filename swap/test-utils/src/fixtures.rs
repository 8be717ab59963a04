// Copyright (c) 2024 The Botho Foundation

//! Deterministic orders for tests.

use std::sync::Arc;

use alloy::primitives::U256;
use fusion_swap_core::{
    Asset, AuctionDetails, Chain, CrossChainOrder, CrossChainOrderExtra, CrossChainOrderInfo,
    Details, Eip712OrderHasher, EscrowParams, EvmOrderSigner, KeccakAddressMapper, OrderHasher,
    OrderPolicy, OrderSigner, Secret, SignedCrossChainOrder, WhitelistItem,
};

/// secp256k1 key of the fixture maker.
pub const MAKER_KEY: [u8; 32] = [7u8; 32];

pub const EVM_ESCROW_FACTORY: &str = "0x1111111111111111111111111111111111111111";
pub const EVM_RESOLVER_ADDRESS: &str = "0x4444444444444444444444444444444444444444";
/// tz1 address of the ed25519 seed `[1; 32]`.
pub const TEZOS_RESOLVER_ADDRESS: &str = "tz1c8PEDNfj6UxoQM2XCyfTHM5KbGGgoqDrH";
pub const TEZOS_RECEIVER: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

pub const USDC_ADDRESS: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const USDT_ADDRESS: &str = "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh";

pub const FIXTURE_AUCTION_START: u64 = 1_700_000_000;
/// Source escrow deployment time reported by the mock chains.
pub const FIXTURE_DEPLOYED_AT: u64 = 1_700_000_100;

pub fn maker_signer() -> EvmOrderSigner {
    EvmOrderSigner::from_bytes(&MAKER_KEY).expect("fixture key is valid")
}

pub fn order_hasher() -> Eip712OrderHasher {
    Eip712OrderHasher::new(Arc::new(KeccakAddressMapper))
}

/// Unsigned 100 USDC (Ethereum) to 100 USDT (Tezos) order locked to `secret`.
pub fn fixture_unsigned_order(secret: &Secret) -> CrossChainOrder {
    let policy = OrderPolicy::default();
    CrossChainOrder {
        escrow_factory: EVM_ESCROW_FACTORY.to_string(),
        order_info: CrossChainOrderInfo {
            maker_asset: Asset::new(USDC_ADDRESS),
            taker_asset: Asset::new(USDT_ADDRESS),
            making_amount: U256::from(100_000_000u64),
            taking_amount: U256::from(100_000_000u64),
            maker: maker_signer().address(),
            receiver: Some(TEZOS_RECEIVER.to_string()),
            salt: Some(U256::from(7u64)),
        },
        escrow_params: EscrowParams {
            hash_lock: secret.hash_lock(),
            src_chain: Chain::Ethereum,
            dst_chain: Chain::TezosGhostnet,
            src_safety_deposit: policy.safety_deposit(Chain::Ethereum),
            dst_safety_deposit: policy.safety_deposit(Chain::TezosGhostnet),
            time_locks: policy.time_locks,
        },
        details: Details {
            auction: AuctionDetails {
                start_time: FIXTURE_AUCTION_START,
                duration: policy.auction_duration,
                ..Default::default()
            },
            fees: None,
            whitelist: vec![WhitelistItem {
                address: EVM_RESOLVER_ADDRESS.to_string(),
                allow_from: 0,
            }],
            resolving_start_time: Some(0),
        },
        extra: CrossChainOrderExtra {
            nonce: Some(U256::from(1u64)),
            enable_permit2: Some(false),
            allow_multiple_fills: Some(false),
            allow_partial_fills: Some(false),
            ..Default::default()
        },
    }
}

/// [`fixture_unsigned_order`] hashed and signed by the fixture maker.
pub fn fixture_order(secret: &Secret) -> SignedCrossChainOrder {
    sign_fixture(fixture_unsigned_order(secret))
}

/// Hash and sign an arbitrary order with the fixture maker key.
pub fn sign_fixture(order: CrossChainOrder) -> SignedCrossChainOrder {
    let order_hash = order_hasher()
        .order_hash(&order)
        .expect("fixture order hashes");
    let signature = maker_signer()
        .sign_order_hash(&order_hash)
        .expect("fixture order signs");
    SignedCrossChainOrder {
        order,
        signature,
        order_hash,
    }
}
