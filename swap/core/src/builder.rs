// Copyright (c) 2024 The Botho Foundation

//! Maker-side order construction.
//!
//! Turns a human swap request (amounts, token symbols, chains) into a
//! hash-committed order and signs it for the source chain.

use std::{collections::HashMap, sync::Arc};

use alloy::primitives::{B256, U256};
use async_trait::async_trait;
use rand::{rngs::OsRng, Rng};
use tracing::debug;

use crate::{
    chains::Chain,
    error::SwapError,
    hashing::{AddressMapper, OrderHasher},
    hashlock::Secret,
    order::{
        AuctionDetails, CrossChainOrder, CrossChainOrderExtra, CrossChainOrderInfo, Details,
        EscrowParams, SignedCrossChainOrder, WhitelistItem, MAX_NONCE,
    },
    signing::OrderSigner,
    timelocks::TimeLocks,
    tokens::TokenRegistry,
};

/// Source of the latest block timestamp on the source chain.
#[async_trait]
pub trait BlockClock: Send + Sync {
    async fn latest_block_timestamp(&self) -> Result<u64, SwapError>;
}

/// Deployment policy applied to every order. None of these values are
/// mandated by the escrow contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPolicy {
    pub time_locks: TimeLocks,
    /// Safety deposit posted on each chain, in that chain's native units.
    pub safety_deposits: HashMap<Chain, U256>,
    pub auction_duration: u64,
    pub initial_rate_bump: u32,
    /// Salts are drawn from `0..max_salt`
    pub max_salt: u64,
    pub resolving_start_time: u64,
    pub whitelist_allow_from: u64,
    pub allow_partial_fills: bool,
    pub allow_multiple_fills: bool,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            time_locks: TimeLocks {
                src_withdrawal: 0,
                src_public_withdrawal: 120,
                src_cancellation: 121,
                src_public_cancellation: 122,
                dst_withdrawal: 0,
                dst_public_withdrawal: 100,
                dst_cancellation: 101,
            },
            safety_deposits: HashMap::from([
                // 0.001 ETH
                (Chain::Ethereum, U256::from(1_000_000_000_000_000u64)),
                // 0.001 XTZ
                (Chain::TezosGhostnet, U256::from(1_000u64)),
            ]),
            auction_duration: 120,
            initial_rate_bump: 0,
            max_salt: 1000,
            resolving_start_time: 0,
            whitelist_allow_from: 0,
            allow_partial_fills: false,
            allow_multiple_fills: false,
        }
    }
}

impl OrderPolicy {
    pub fn safety_deposit(&self, chain: Chain) -> U256 {
        self.safety_deposits.get(&chain).copied().unwrap_or_default()
    }
}

/// A swap as requested by the maker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub src_chain: Chain,
    pub src_token: String,
    /// Human amount, e.g. "100.5"
    pub src_amount: String,
    pub dst_chain: Chain,
    pub dst_token: String,
    pub dst_amount: String,
    /// Destination chain receiver. The maker when unset.
    pub receiver: Option<String>,
}

/// A built order with the secret behind its hash-lock.
#[derive(Debug, Clone)]
pub struct PreparedOrder {
    pub order: CrossChainOrder,
    pub order_hash: B256,
    pub secret: Secret,
}

pub struct OrderBuilder {
    tokens: TokenRegistry,
    escrow_factories: HashMap<Chain, String>,
    resolvers: HashMap<Chain, String>,
    policy: OrderPolicy,
    hasher: Arc<dyn OrderHasher>,
    mapper: Arc<dyn AddressMapper>,
    clock: Arc<dyn BlockClock>,
    signer: Arc<dyn OrderSigner>,
}

impl OrderBuilder {
    pub fn new(
        tokens: TokenRegistry,
        hasher: Arc<dyn OrderHasher>,
        mapper: Arc<dyn AddressMapper>,
        clock: Arc<dyn BlockClock>,
        signer: Arc<dyn OrderSigner>,
    ) -> Self {
        Self {
            tokens,
            escrow_factories: HashMap::new(),
            resolvers: HashMap::new(),
            policy: OrderPolicy::default(),
            hasher,
            mapper,
            clock,
            signer,
        }
    }

    /// Register the escrow factory orders from `chain` are bound to.
    pub fn with_escrow_factory(mut self, chain: Chain, address: impl Into<String>) -> Self {
        self.escrow_factories.insert(chain, address.into());
        self
    }

    /// Register the resolver allowed to fill orders whose destination is `chain`.
    pub fn with_resolver(mut self, chain: Chain, address: impl Into<String>) -> Self {
        self.resolvers.insert(chain, address.into());
        self
    }

    pub fn with_policy(mut self, policy: OrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &OrderPolicy {
        &self.policy
    }

    /// A fresh secret from the OS CSPRNG. Never reuse one across orders.
    pub fn create_secret(&self) -> Secret {
        Secret::random()
    }

    /// Build and hash an order. The only network access is reading the
    /// source chain's latest block timestamp for the auction start.
    pub async fn build_order(&self, request: &SwapRequest) -> Result<PreparedOrder, SwapError> {
        let src = request.src_chain;
        let dst = request.dst_chain;

        if src == dst {
            return Err(SwapError::UnsupportedRoute { src, dst });
        }
        if self.signer.chain() != src {
            return Err(SwapError::UnsupportedRoute { src, dst });
        }
        let escrow_factory = self
            .escrow_factories
            .get(&src)
            .ok_or_else(|| SwapError::UnsupportedChain(src.to_string()))?;
        let resolver = self
            .resolvers
            .get(&dst)
            .ok_or_else(|| SwapError::UnsupportedChain(dst.to_string()))?;

        let (maker_asset, src_token) = self.tokens.asset(src, &request.src_token)?;
        let (taker_asset, dst_token) = self.tokens.asset(dst, &request.dst_token)?;
        let making_amount = src_token.parse_amount(&request.src_amount)?;
        let taking_amount = dst_token.parse_amount(&request.dst_amount)?;

        let secret = self.create_secret();
        let hash_lock = secret.hash_lock();

        let (salt, nonce) = {
            let mut rng = OsRng;
            let salt = rng.gen_range(0..self.policy.max_salt.max(1));
            let nonce = rng.gen_range(0..=MAX_NONCE);
            (salt, nonce)
        };

        let start_time = self.clock.latest_block_timestamp().await?;
        let whitelisted = self.mapper.map_address(resolver)?;

        let order = CrossChainOrder {
            escrow_factory: escrow_factory.clone(),
            order_info: CrossChainOrderInfo {
                maker_asset,
                taker_asset,
                making_amount,
                taking_amount,
                maker: self.signer.address(),
                receiver: request.receiver.clone(),
                salt: Some(U256::from(salt)),
            },
            escrow_params: EscrowParams {
                hash_lock,
                src_chain: src,
                dst_chain: dst,
                src_safety_deposit: self.policy.safety_deposit(src),
                dst_safety_deposit: self.policy.safety_deposit(dst),
                time_locks: self.policy.time_locks,
            },
            details: Details {
                auction: AuctionDetails {
                    start_time,
                    initial_rate_bump: self.policy.initial_rate_bump,
                    duration: self.policy.auction_duration,
                    points: Vec::new(),
                    gas_cost: None,
                },
                fees: None,
                whitelist: vec![WhitelistItem {
                    address: whitelisted.to_checksum(None),
                    allow_from: self.policy.whitelist_allow_from,
                }],
                resolving_start_time: Some(self.policy.resolving_start_time),
            },
            extra: CrossChainOrderExtra {
                nonce: Some(U256::from(nonce)),
                enable_permit2: Some(false),
                allow_partial_fills: Some(self.policy.allow_partial_fills),
                allow_multiple_fills: Some(self.policy.allow_multiple_fills),
                ..Default::default()
            },
        };

        order.validate()?;
        let order_hash = self.hasher.order_hash(&order)?;
        debug!(%order_hash, %src, %dst, "Built cross-chain order");

        Ok(PreparedOrder {
            order,
            order_hash,
            secret,
        })
    }

    /// Sign a prepared order with the source chain signer.
    pub fn sign(&self, prepared: &PreparedOrder) -> Result<SignedCrossChainOrder, SwapError> {
        if self.signer.chain() != prepared.order.src_chain() {
            return Err(SwapError::Signing(format!(
                "signer for {} cannot authorize an order from {}",
                self.signer.chain(),
                prepared.order.src_chain()
            )));
        }

        let signature = self.signer.sign_order_hash(&prepared.order_hash)?;
        Ok(SignedCrossChainOrder {
            order: prepared.order.clone(),
            signature,
            order_hash: prepared.order_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hashing::{Eip712OrderHasher, KeccakAddressMapper},
        limit_order::{self, LimitOrderParts, LIMIT_ORDER_PROTOCOL},
        signing::{recover_evm_signer, EvmOrderSigner},
    };

    struct FixedBlockClock(u64);

    #[async_trait]
    impl BlockClock for FixedBlockClock {
        async fn latest_block_timestamp(&self) -> Result<u64, SwapError> {
            Ok(self.0)
        }
    }

    fn builder() -> OrderBuilder {
        let mapper: Arc<dyn AddressMapper> = Arc::new(KeccakAddressMapper);
        OrderBuilder::new(
            TokenRegistry::defaults(),
            Arc::new(Eip712OrderHasher::new(mapper.clone())),
            mapper,
            Arc::new(FixedBlockClock(1_700_000_000)),
            Arc::new(EvmOrderSigner::from_bytes(&[7u8; 32]).unwrap()),
        )
        .with_escrow_factory(Chain::Ethereum, "0x1111111111111111111111111111111111111111")
        .with_resolver(Chain::TezosGhostnet, "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb")
    }

    fn request() -> SwapRequest {
        SwapRequest {
            src_chain: Chain::Ethereum,
            src_token: "USDC".to_string(),
            src_amount: "100".to_string(),
            dst_chain: Chain::TezosGhostnet,
            dst_token: "USDT".to_string(),
            dst_amount: "100".to_string(),
            receiver: Some("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".to_string()),
        }
    }

    #[tokio::test]
    async fn test_build_order_applies_policy() {
        let builder = builder();
        let prepared = builder.build_order(&request()).await.unwrap();
        let order = &prepared.order;

        assert_eq!(order.order_info.making_amount, U256::from(100_000_000u64));
        assert_eq!(order.order_info.taking_amount, U256::from(100_000_000u64));
        assert_eq!(order.escrow_params.hash_lock, prepared.secret.hash_lock());
        assert_eq!(order.escrow_params.time_locks, OrderPolicy::default().time_locks);
        assert_eq!(
            order.escrow_params.src_safety_deposit,
            U256::from(1_000_000_000_000_000u64)
        );
        assert_eq!(order.escrow_params.dst_safety_deposit, U256::from(1_000u64));
        assert_eq!(order.details.auction.start_time, 1_700_000_000);
        assert_eq!(order.details.auction.duration, 120);
        assert!(order.order_info.salt.unwrap() < U256::from(1000u64));
        assert!(order.extra.nonce.unwrap() <= U256::from(MAX_NONCE));
        assert_eq!(order.extra.allow_partial_fills, Some(false));
        assert_eq!(order.extra.enable_permit2, Some(false));

        let mapped = KeccakAddressMapper
            .map_address("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb")
            .unwrap();
        assert_eq!(order.details.whitelist[0].address, mapped.to_checksum(None));
    }

    #[tokio::test]
    async fn test_each_order_gets_a_fresh_secret() {
        let builder = builder();
        let a = builder.build_order(&request()).await.unwrap();
        let b = builder.build_order(&request()).await.unwrap();
        assert_ne!(a.secret, b.secret);
        assert_ne!(a.order_hash, b.order_hash);
    }

    #[tokio::test]
    async fn test_signature_recovers_to_maker() {
        let builder = builder();
        let prepared = builder.build_order(&request()).await.unwrap();
        let signed = builder.sign(&prepared).unwrap();

        let recovered = recover_evm_signer(&signed.order_hash, &signed.signature).unwrap();
        assert_eq!(recovered.to_checksum(None), signed.order.order_info.maker);

        // The digest signed is the one the limit order protocol verifies
        let limit_order = LimitOrderParts::build(&signed.order, &KeccakAddressMapper).unwrap();
        let domain = limit_order::domain(1, LIMIT_ORDER_PROTOCOL);
        assert_eq!(signed.order_hash, limit_order.order_hash(&domain));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let mut req = request();
        req.dst_token = "DOGE".to_string();
        assert!(matches!(
            builder().build_order(&req).await,
            Err(SwapError::TokenNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_native_token_rejected() {
        let mut req = request();
        req.src_token = "ETH".to_string();
        assert!(matches!(
            builder().build_order(&req).await,
            Err(SwapError::NativeTokenUnsupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_unsupported_routes() {
        let mut same = request();
        same.dst_chain = Chain::Ethereum;
        assert!(matches!(
            builder().build_order(&same).await,
            Err(SwapError::UnsupportedRoute { .. })
        ));

        // No factory configured for Tezos and the signer is an EVM key
        let mut reversed = request();
        reversed.src_chain = Chain::TezosGhostnet;
        reversed.dst_chain = Chain::Ethereum;
        assert!(builder().build_order(&reversed).await.is_err());
    }
}
