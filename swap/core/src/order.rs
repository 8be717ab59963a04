// Copyright (c) 2024 The Botho Foundation

//! Cross-chain order model.
//!
//! Addresses are kept in their chain-native encoding (0x hex on Ethereum,
//! base58 on Tezos). Hashing maps them to the 20-byte EVM form through an
//! [`crate::AddressMapper`].

use alloy::primitives::{B256, U256};

use crate::{
    chains::{Chain, ChainAddress},
    error::SwapError,
    hashlock::HashLock,
    timelocks::TimeLocks,
};

/// Largest nonce accepted by the escrow factory (40 bits).
pub const MAX_NONCE: u64 = (1 << 40) - 1;

/// A token on one chain, with the sub-identifier used by multi-asset
/// standards such as FA2.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    pub address: String,
    pub token_id: Option<U256>,
}

impl Asset {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token_id: None,
        }
    }

    pub fn with_token_id(address: impl Into<String>, token_id: U256) -> Self {
        Self {
            address: address.into(),
            token_id: Some(token_id),
        }
    }
}

/// What the maker gives and what they want in return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainOrderInfo {
    /// Source chain asset
    pub maker_asset: Asset,
    /// Destination chain asset
    pub taker_asset: Asset,
    /// Source chain amount
    pub making_amount: U256,
    /// Destination chain minimum amount
    pub taking_amount: U256,
    pub maker: String,
    /// Destination chain receiver. The maker when unset.
    pub receiver: Option<String>,
    pub salt: Option<U256>,
}

impl CrossChainOrderInfo {
    pub fn receiver_or_maker(&self) -> &str {
        self.receiver.as_deref().unwrap_or(&self.maker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowParams {
    pub hash_lock: HashLock,
    pub src_chain: Chain,
    pub dst_chain: Chain,
    pub src_safety_deposit: U256,
    pub dst_safety_deposit: U256,
    pub time_locks: TimeLocks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionPoint {
    pub delay: u32,
    pub coefficient: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionGasCostInfo {
    pub gas_bump_estimate: U256,
    pub gas_price_estimate: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuctionDetails {
    pub start_time: u64,
    pub initial_rate_bump: u32,
    pub duration: u64,
    pub points: Vec<AuctionPoint>,
    pub gas_cost: Option<AuctionGasCostInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegratorFee {
    pub ratio: U256,
    pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fees {
    pub integrator_fee: Option<IntegratorFee>,
    pub bank_fee: Option<U256>,
}

/// A resolver allowed to fill the order, from `allow_from` onwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistItem {
    /// EVM-form address (Tezos resolvers are mapped)
    pub address: String,
    pub allow_from: u64,
}

/// Auction and resolver-eligibility metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Details {
    pub auction: AuctionDetails,
    pub fees: Option<Fees>,
    pub whitelist: Vec<WhitelistItem>,
    /// Time from which the order can be executed
    pub resolving_start_time: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrossChainOrderExtra {
    /// At most 40 bits
    pub nonce: Option<U256>,
    pub permit: Option<String>,
    /// The order expires this long after the auction ends
    pub order_expiration_delay: Option<u64>,
    pub enable_permit2: Option<bool>,
    pub source: Option<String>,
    pub allow_multiple_fills: Option<bool>,
    pub allow_partial_fills: Option<bool>,
}

/// The maker's swap intent. Immutable once signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainOrder {
    /// Escrow factory on the source chain
    pub escrow_factory: String,
    pub order_info: CrossChainOrderInfo,
    pub escrow_params: EscrowParams,
    pub details: Details,
    pub extra: CrossChainOrderExtra,
}

impl CrossChainOrder {
    pub fn src_chain(&self) -> Chain {
        self.escrow_params.src_chain
    }

    pub fn dst_chain(&self) -> Chain {
        self.escrow_params.dst_chain
    }

    pub fn hash_lock(&self) -> HashLock {
        self.escrow_params.hash_lock
    }

    /// Structural checks that need no network access.
    pub fn validate(&self) -> Result<(), SwapError> {
        let src = self.src_chain();
        let dst = self.dst_chain();

        if src == dst {
            return Err(SwapError::UnsupportedRoute { src, dst });
        }

        if self.order_info.making_amount.is_zero() {
            return Err(SwapError::InvalidAmount {
                field: "makingAmount",
                reason: "must be positive".to_string(),
            });
        }
        if self.order_info.taking_amount.is_zero() {
            return Err(SwapError::InvalidAmount {
                field: "takingAmount",
                reason: "must be positive".to_string(),
            });
        }

        self.escrow_params.time_locks.validate()?;

        ChainAddress::new(src, &self.escrow_factory).validate()?;
        ChainAddress::new(src, &self.order_info.maker).validate()?;
        ChainAddress::new(src, &self.order_info.maker_asset.address).validate()?;
        ChainAddress::new(dst, &self.order_info.taker_asset.address).validate()?;
        // Whoever receives the destination funds must exist on that chain
        ChainAddress::new(dst, self.order_info.receiver_or_maker()).validate()?;

        for item in &self.details.whitelist {
            ChainAddress::new(Chain::Ethereum, &item.address).validate()?;
        }

        self.check_hashed_fields_present()?;

        if let Some(nonce) = self.extra.nonce {
            if nonce > U256::from(MAX_NONCE) {
                return Err(SwapError::InvalidOrder(format!(
                    "nonce {} exceeds 40 bits",
                    nonce
                )));
            }
        }

        Ok(())
    }

    /// Optional fields that hash as their default when absent must be given
    /// explicitly, so two encodings of one order cannot share a hash.
    fn check_hashed_fields_present(&self) -> Result<(), SwapError> {
        let info = &self.order_info;
        let extra = &self.extra;
        let required = [
            ("salt", info.salt.is_some()),
            ("nonce", extra.nonce.is_some()),
            ("resolvingStartTime", self.details.resolving_start_time.is_some()),
            ("allowPartialFills", extra.allow_partial_fills.is_some()),
            ("allowMultipleFills", extra.allow_multiple_fills.is_some()),
            ("enablePermit2", extra.enable_permit2.is_some()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, present)| !present) {
            return Err(SwapError::InvalidOrder(format!("{} is required", field)));
        }

        if let Some(permit) = &extra.permit {
            if permit.trim_start_matches("0x").is_empty() {
                return Err(SwapError::InvalidOrder("permit is empty".to_string()));
            }
        }
        if extra.source.as_deref() == Some("") {
            return Err(SwapError::InvalidOrder("source is empty".to_string()));
        }
        Ok(())
    }
}

/// An order together with the maker's authorization and its claimed hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCrossChainOrder {
    pub order: CrossChainOrder,
    /// 0x-prefixed signature over `order_hash`
    pub signature: String,
    pub order_hash: B256,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::hashlock::Secret;

    pub(crate) fn sample_order() -> CrossChainOrder {
        CrossChainOrder {
            escrow_factory: "0x1111111111111111111111111111111111111111".to_string(),
            order_info: CrossChainOrderInfo {
                maker_asset: Asset::new("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
                taker_asset: Asset::new("KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh"),
                making_amount: U256::from(100_000_000u64),
                taking_amount: U256::from(99_000_000u64),
                maker: "0x2222222222222222222222222222222222222222".to_string(),
                receiver: Some("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".to_string()),
                salt: Some(U256::from(42u64)),
            },
            escrow_params: EscrowParams {
                hash_lock: Secret::from_bytes([7u8; 32]).hash_lock(),
                src_chain: Chain::Ethereum,
                dst_chain: Chain::TezosGhostnet,
                src_safety_deposit: U256::from(1_000_000_000_000_000u64),
                dst_safety_deposit: U256::from(1_000u64),
                time_locks: TimeLocks {
                    src_withdrawal: 0,
                    src_public_withdrawal: 120,
                    src_cancellation: 121,
                    src_public_cancellation: 122,
                    dst_withdrawal: 0,
                    dst_public_withdrawal: 100,
                    dst_cancellation: 101,
                },
            },
            details: Details {
                auction: AuctionDetails {
                    start_time: 1_700_000_000,
                    initial_rate_bump: 0,
                    duration: 120,
                    points: vec![],
                    gas_cost: None,
                },
                fees: None,
                whitelist: vec![WhitelistItem {
                    address: "0x3333333333333333333333333333333333333333".to_string(),
                    allow_from: 0,
                }],
                resolving_start_time: Some(0),
            },
            extra: CrossChainOrderExtra {
                nonce: Some(U256::from(12345u64)),
                enable_permit2: Some(false),
                allow_multiple_fills: Some(false),
                allow_partial_fills: Some(false),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_sample_order_is_valid() {
        sample_order().validate().unwrap();
    }

    #[test]
    fn test_same_chain_rejected() {
        let mut order = sample_order();
        order.escrow_params.dst_chain = Chain::Ethereum;
        assert!(matches!(
            order.validate(),
            Err(SwapError::UnsupportedRoute { .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut order = sample_order();
        order.order_info.making_amount = U256::ZERO;
        assert!(matches!(
            order.validate(),
            Err(SwapError::InvalidAmount { field: "makingAmount", .. })
        ));
    }

    #[test]
    fn test_bad_timelocks_rejected() {
        let mut order = sample_order();
        order.escrow_params.time_locks.src_cancellation = 120;
        assert!(matches!(
            order.validate(),
            Err(SwapError::InvalidTimeLocks(_))
        ));
    }

    #[test]
    fn test_addresses_checked_against_their_chain() {
        let mut order = sample_order();
        order.order_info.taker_asset = Asset::new("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert!(matches!(
            order.validate(),
            Err(SwapError::InvalidAddress { chain: Chain::TezosGhostnet, .. })
        ));
    }

    #[test]
    fn test_destination_maker_must_live_on_destination_chain() {
        let mut order = sample_order();
        order.order_info.receiver = None;
        assert!(matches!(
            order.validate(),
            Err(SwapError::InvalidAddress { chain: Chain::TezosGhostnet, .. })
        ));

        order.order_info.receiver = Some("0x2222222222222222222222222222222222222222".to_string());
        assert!(matches!(
            order.validate(),
            Err(SwapError::InvalidAddress { chain: Chain::TezosGhostnet, .. })
        ));
    }

    #[test]
    fn test_fields_hashed_by_default_must_be_present() {
        let cases: Vec<(&str, Box<dyn Fn(&mut CrossChainOrder)>)> = vec![
            ("salt", Box::new(|o| o.order_info.salt = None)),
            ("nonce", Box::new(|o| o.extra.nonce = None)),
            ("resolvingStartTime", Box::new(|o| o.details.resolving_start_time = None)),
            ("allowPartialFills", Box::new(|o| o.extra.allow_partial_fills = None)),
            ("allowMultipleFills", Box::new(|o| o.extra.allow_multiple_fills = None)),
            ("enablePermit2", Box::new(|o| o.extra.enable_permit2 = None)),
            ("permit", Box::new(|o| o.extra.permit = Some("0x".to_string()))),
            ("source", Box::new(|o| o.extra.source = Some(String::new()))),
        ];

        for (field, mutate) in cases {
            let mut order = sample_order();
            mutate(&mut order);
            match order.validate() {
                Err(SwapError::InvalidOrder(reason)) => {
                    assert!(reason.starts_with(field), "{}: {}", field, reason)
                }
                other => panic!("{}: unexpected {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_nonce_limited_to_40_bits() {
        let mut order = sample_order();
        order.extra.nonce = Some(U256::from(MAX_NONCE) + U256::from(1u64));
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_receiver_defaults_to_maker() {
        let mut order = sample_order();
        assert_eq!(
            order.order_info.receiver_or_maker(),
            "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"
        );
        order.order_info.receiver = None;
        assert_eq!(
            order.order_info.receiver_or_maker(),
            "0x2222222222222222222222222222222222222222"
        );
    }
}
