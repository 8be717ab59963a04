// Copyright (c) 2024 The Botho Foundation

//! Order hashing and cross-chain address mapping.
//!
//! Orders from an EVM chain are hashed as the limit order the protocol
//! verifies on fill. Orders from Tezos are hashed as EIP-712 typed data over
//! the whole order, checked by the Tezos escrow factory. Tezos addresses have
//! no 20-byte form, so they are mapped first.

use std::{borrow::Cow, str::FromStr, sync::Arc};

use alloy::{
    primitives::{keccak256, Address, Bytes, B256, U256},
    sol_types::{Eip712Domain, SolStruct},
};

use crate::{
    chains::{Chain, ChainAddress},
    error::SwapError,
    limit_order::{self, LimitOrderParts, LIMIT_ORDER_PROTOCOL},
    order::{Asset, CrossChainOrder},
};

pub const DOMAIN_NAME: &str = "Fusion Cross-Chain Swap";
pub const DOMAIN_VERSION: &str = "1";

mod typed {
    alloy::sol! {
        struct AuctionPoint {
            uint32 delay;
            uint32 coefficient;
        }

        struct AuctionDetails {
            uint64 startTime;
            uint32 initialRateBump;
            uint64 duration;
            AuctionPoint[] points;
            uint256 gasBumpEstimate;
            uint256 gasPriceEstimate;
        }

        struct Fees {
            uint256 integratorFeeRatio;
            address integratorFeeReceiver;
            uint256 bankFee;
        }

        struct WhitelistItem {
            address resolver;
            uint64 allowFrom;
        }

        struct Order {
            uint256 salt;
            address maker;
            address receiver;
            address makerAsset;
            address takerAsset;
            uint256 makingAmount;
            uint256 takingAmount;
            bytes32 hashLock;
            uint256 srcChainId;
            uint256 dstChainId;
            uint256 srcSafetyDeposit;
            uint256 dstSafetyDeposit;
            uint256 timeLocks;
            AuctionDetails auction;
            Fees fees;
            WhitelistItem[] whitelist;
            uint64 resolvingStartTime;
            uint256 nonce;
            bytes permit;
            uint64 orderExpirationDelay;
            bool enablePermit2;
            string source;
            bool allowMultipleFills;
            bool allowPartialFills;
        }
    }
}

/// Maps chain-native addresses into the 20-byte form used for hashing.
pub trait AddressMapper: Send + Sync {
    fn map_address(&self, address: &str) -> Result<Address, SwapError>;

    /// Map an asset. Multi-asset tokens include their id in the mapping.
    fn map_asset(&self, asset: &Asset) -> Result<Address, SwapError>;
}

/// EVM addresses map to themselves. Tezos addresses map to the last 20 bytes
/// of `keccak256(utf8(address))`, with `":<tokenId>"` appended for FA2 assets.
///
/// The mapping is one-way and carries no key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeccakAddressMapper;

impl KeccakAddressMapper {
    fn hash_to_address(input: &str) -> Address {
        Address::from_word(keccak256(input.as_bytes()))
    }

    fn parse_evm(address: &str) -> Result<Address, SwapError> {
        Address::from_str(address).map_err(|e| SwapError::InvalidAddress {
            chain: Chain::Ethereum,
            address: address.to_string(),
            reason: e.to_string(),
        })
    }
}

impl AddressMapper for KeccakAddressMapper {
    fn map_address(&self, address: &str) -> Result<Address, SwapError> {
        if address.starts_with("0x") {
            return Self::parse_evm(address);
        }
        ChainAddress::new(Chain::TezosGhostnet, address).validate()?;
        Ok(Self::hash_to_address(address))
    }

    fn map_asset(&self, asset: &Asset) -> Result<Address, SwapError> {
        match (&asset.token_id, asset.address.starts_with("0x")) {
            (None, _) => self.map_address(&asset.address),
            (Some(_), true) => Err(SwapError::InvalidOrder(format!(
                "token id is not supported for EVM asset {}",
                asset.address
            ))),
            (Some(id), false) => {
                ChainAddress::new(Chain::TezosGhostnet, &asset.address).validate()?;
                Ok(Self::hash_to_address(&format!("{}:{}", asset.address, id)))
            }
        }
    }
}

/// Computes the chain-scoped digest identifying an order.
pub trait OrderHasher: Send + Sync {
    fn order_hash(&self, order: &CrossChainOrder) -> Result<B256, SwapError>;
}

/// EIP-712 order hashing.
///
/// EVM-sourced orders hash as a [`limit_order::LimitOrder`] under the limit
/// order protocol domain. Tezos-sourced orders hash as the full typed order
/// under a domain binding the source chain id and its escrow factory.
pub struct Eip712OrderHasher {
    mapper: Arc<dyn AddressMapper>,
    limit_order_protocol: Address,
}

impl Eip712OrderHasher {
    pub fn new(mapper: Arc<dyn AddressMapper>) -> Self {
        Self {
            mapper,
            limit_order_protocol: LIMIT_ORDER_PROTOCOL,
        }
    }

    /// Sign for a limit order protocol deployed elsewhere (local forks).
    pub fn with_limit_order_protocol(mut self, protocol: Address) -> Self {
        self.limit_order_protocol = protocol;
        self
    }

    pub fn domain(&self, order: &CrossChainOrder) -> Result<Eip712Domain, SwapError> {
        let chain_id = order.src_chain().domain_chain_id();
        if order.src_chain().is_evm() {
            return Ok(limit_order::domain(chain_id, self.limit_order_protocol));
        }

        let factory = self.mapper.map_address(&order.escrow_factory)?;
        Ok(Eip712Domain::new(
            Some(Cow::Borrowed(DOMAIN_NAME)),
            Some(Cow::Borrowed(DOMAIN_VERSION)),
            Some(U256::from(chain_id)),
            Some(factory),
            None,
        ))
    }

    /// The limit order an EVM-sourced order is filled as.
    pub fn limit_order(&self, order: &CrossChainOrder) -> Result<LimitOrderParts, SwapError> {
        LimitOrderParts::build(order, self.mapper.as_ref())
    }

    fn typed_order(&self, order: &CrossChainOrder) -> Result<typed::Order, SwapError> {
        let info = &order.order_info;
        let params = &order.escrow_params;
        let details = &order.details;
        let extra = &order.extra;

        let receiver = match &info.receiver {
            Some(receiver) => self.mapper.map_address(receiver)?,
            None => Address::ZERO,
        };

        let gas_cost = details.auction.gas_cost;
        let auction = typed::AuctionDetails {
            startTime: details.auction.start_time,
            initialRateBump: details.auction.initial_rate_bump,
            duration: details.auction.duration,
            points: details
                .auction
                .points
                .iter()
                .map(|p| typed::AuctionPoint {
                    delay: p.delay,
                    coefficient: p.coefficient,
                })
                .collect(),
            gasBumpEstimate: gas_cost.map(|g| g.gas_bump_estimate).unwrap_or_default(),
            gasPriceEstimate: gas_cost.map(|g| g.gas_price_estimate).unwrap_or_default(),
        };

        let fees = details.fees.clone().unwrap_or_default();
        let (fee_ratio, fee_receiver) = match &fees.integrator_fee {
            Some(fee) => (fee.ratio, self.mapper.map_address(&fee.receiver)?),
            None => (U256::ZERO, Address::ZERO),
        };

        let whitelist = details
            .whitelist
            .iter()
            .map(|item| {
                Ok(typed::WhitelistItem {
                    resolver: self.mapper.map_address(&item.address)?,
                    allowFrom: item.allow_from,
                })
            })
            .collect::<Result<Vec<_>, SwapError>>()?;

        let permit = match &extra.permit {
            Some(permit) => {
                let stripped = permit.strip_prefix("0x").unwrap_or(permit);
                Bytes::from(hex::decode(stripped).map_err(|e| SwapError::InvalidHex {
                    field: "permit",
                    reason: e.to_string(),
                })?)
            }
            None => Bytes::new(),
        };

        Ok(typed::Order {
            salt: info.salt.unwrap_or_default(),
            maker: self.mapper.map_address(&info.maker)?,
            receiver,
            makerAsset: self.mapper.map_asset(&info.maker_asset)?,
            takerAsset: self.mapper.map_asset(&info.taker_asset)?,
            makingAmount: info.making_amount,
            takingAmount: info.taking_amount,
            hashLock: params.hash_lock.as_b256(),
            srcChainId: U256::from(params.src_chain.domain_chain_id()),
            dstChainId: U256::from(params.dst_chain.domain_chain_id()),
            srcSafetyDeposit: params.src_safety_deposit,
            dstSafetyDeposit: params.dst_safety_deposit,
            timeLocks: params.time_locks.pack(0),
            auction,
            fees: typed::Fees {
                integratorFeeRatio: fee_ratio,
                integratorFeeReceiver: fee_receiver,
                bankFee: fees.bank_fee.unwrap_or_default(),
            },
            whitelist,
            resolvingStartTime: details.resolving_start_time.unwrap_or_default(),
            nonce: extra.nonce.unwrap_or_default(),
            permit,
            orderExpirationDelay: extra.order_expiration_delay.unwrap_or_default(),
            enablePermit2: extra.enable_permit2.unwrap_or_default(),
            source: extra.source.clone().unwrap_or_default(),
            allowMultipleFills: extra.allow_multiple_fills.unwrap_or_default(),
            allowPartialFills: extra.allow_partial_fills.unwrap_or_default(),
        })
    }
}

impl OrderHasher for Eip712OrderHasher {
    fn order_hash(&self, order: &CrossChainOrder) -> Result<B256, SwapError> {
        let domain = self.domain(order)?;
        if order.src_chain().is_evm() {
            return Ok(self.limit_order(order)?.order_hash(&domain));
        }
        let typed = self.typed_order(order)?;
        Ok(typed.eip712_signing_hash(&domain))
    }
}
