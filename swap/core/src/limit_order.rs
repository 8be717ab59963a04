// Copyright (c) 2024 The Botho Foundation

//! Limit order form of an EVM-sourced cross-chain order.
//!
//! The source escrow is created by the escrow factory as a post-interaction
//! of a limit order fill. The limit order protocol checks the maker's
//! signature against the EIP-712 hash of [`LimitOrder`], and the factory
//! stamps that same hash into the escrow immutables, so this hash is the
//! order hash of every EVM-sourced order.
//!
//! Everything the limit order struct has no field for (hash-lock,
//! time-locks, deposits, destination token, auction, whitelist, fees) is
//! carried in the order extension, whose hash is folded into the salt.

use std::borrow::Cow;

use alloy::{
    primitives::{address, keccak256, Address, Bytes, B256, U256},
    sol_types::{Eip712Domain, SolStruct, SolValue},
};

use crate::{error::SwapError, hashing::AddressMapper, order::CrossChainOrder};

/// Limit order protocol deployment the maker signs for.
pub const LIMIT_ORDER_PROTOCOL: Address = address!("111111125421cA6dc452d289314280a0f8842A65");
pub const LIMIT_ORDER_DOMAIN_NAME: &str = "1inch Aggregation Router";
pub const LIMIT_ORDER_DOMAIN_VERSION: &str = "6";

/// ERC-20 stand-in whose transfers always succeed. The real taker asset
/// lives on the destination chain and is named in the escrow arguments.
pub const TRUE_ERC20: Address = address!("da0000d4000015a526378bb6fafc650cea5966f8");

mod typed {
    alloy::sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Order {
            uint256 salt;
            address maker;
            address receiver;
            address makerAsset;
            address takerAsset;
            uint256 makingAmount;
            uint256 takingAmount;
            uint256 makerTraits;
        }
    }
}

pub use typed::Order as LimitOrder;

// Maker traits
const NO_PARTIAL_FILLS_FLAG: usize = 255;
const ALLOW_MULTIPLE_FILLS_FLAG: usize = 254;
const POST_INTERACTION_CALL_FLAG: usize = 251;
const HAS_EXTENSION_FLAG: usize = 249;
const USE_PERMIT2_FLAG: usize = 248;
const EXPIRATION_OFFSET: usize = 80;
const NONCE_OFFSET: usize = 120;

const SALT_OFFSET: usize = 160;
const TRACK_CODE_OFFSET: usize = 224;

// Extension fields, in offset-table order
const MAKING_AMOUNT_DATA: usize = 2;
const TAKING_AMOUNT_DATA: usize = 3;
const MAKER_PERMIT: usize = 5;
const POST_INTERACTION_DATA: usize = 7;
const EXTENSION_FIELDS: usize = 8;

/// A limit order together with the extension its salt commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitOrderParts {
    pub order: LimitOrder,
    pub extension: Bytes,
}

impl LimitOrderParts {
    /// Map `order` into its limit order form.
    pub fn build(order: &CrossChainOrder, mapper: &dyn AddressMapper) -> Result<Self, SwapError> {
        let extension = extension(order, mapper)?;
        let order = limit_order(order, &extension, mapper)?;
        Ok(Self {
            order,
            extension: extension.into(),
        })
    }

    /// The digest the maker signs and the escrow factory records.
    pub fn order_hash(&self, domain: &Eip712Domain) -> B256 {
        self.order.eip712_signing_hash(domain)
    }
}

/// EIP-712 domain of the limit order protocol on `chain_id`.
pub fn domain(chain_id: u64, protocol: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(LIMIT_ORDER_DOMAIN_NAME)),
        Some(Cow::Borrowed(LIMIT_ORDER_DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        Some(protocol),
        None,
    )
}

/// Append the low `len` bytes of `value`, failing when it does not fit.
fn push_uint(
    data: &mut Vec<u8>,
    field: &'static str,
    value: U256,
    len: usize,
) -> Result<(), SwapError> {
    if value.bit_len() > len * 8 {
        return Err(SwapError::InvalidOrder(format!(
            "{} {} does not fit in {} bytes",
            field, value, len
        )));
    }
    data.extend_from_slice(&value.to_be_bytes::<32>()[32 - len..]);
    Ok(())
}

/// Auction curve read by the factory when computing fill amounts.
fn amount_data(order: &CrossChainOrder, factory: Address) -> Result<Vec<u8>, SwapError> {
    let auction = &order.details.auction;
    let (gas_bump, gas_price) = auction
        .gas_cost
        .map(|g| (g.gas_bump_estimate, g.gas_price_estimate))
        .unwrap_or_default();

    let mut data = factory.to_vec();
    push_uint(&mut data, "gasBumpEstimate", gas_bump, 3)?;
    push_uint(&mut data, "gasPriceEstimate", gas_price, 4)?;
    push_uint(&mut data, "auction.startTime", U256::from(auction.start_time), 4)?;
    push_uint(&mut data, "auction.duration", U256::from(auction.duration), 3)?;
    push_uint(
        &mut data,
        "auction.initialRateBump",
        U256::from(auction.initial_rate_bump),
        3,
    )?;
    push_uint(&mut data, "auction.points", U256::from(auction.points.len()), 1)?;
    for point in &auction.points {
        push_uint(&mut data, "point.coefficient", U256::from(point.coefficient), 3)?;
        push_uint(&mut data, "point.delay", U256::from(point.delay), 2)?;
    }
    Ok(data)
}

/// Post-interaction data consumed by the escrow factory: fees, resolver
/// whitelist, then the ABI-encoded escrow arguments.
fn post_interaction(
    order: &CrossChainOrder,
    factory: Address,
    mapper: &dyn AddressMapper,
) -> Result<Vec<u8>, SwapError> {
    let params = &order.escrow_params;
    let details = &order.details;

    let mut data = factory.to_vec();

    match &details.fees {
        Some(fees) => {
            data.push(1);
            let (ratio, receiver) = match &fees.integrator_fee {
                Some(fee) => (fee.ratio, mapper.map_address(&fee.receiver)?),
                None => (U256::ZERO, Address::ZERO),
            };
            push_uint(&mut data, "integratorFee.ratio", ratio, 2)?;
            data.extend_from_slice(receiver.as_slice());
            push_uint(&mut data, "bankFee", fees.bank_fee.unwrap_or_default(), 4)?;
        }
        None => data.push(0),
    }

    let start = details.resolving_start_time.unwrap_or_default();
    push_uint(&mut data, "resolvingStartTime", U256::from(start), 4)?;
    push_uint(&mut data, "whitelist", U256::from(details.whitelist.len()), 1)?;
    for item in &details.whitelist {
        let resolver = mapper.map_address(&item.address)?;
        // Low 10 bytes of the resolver address
        data.extend_from_slice(&resolver.as_slice()[10..]);
        // Entries allowed before resolving starts are allowed from the start
        let delay = item.allow_from.saturating_sub(start);
        push_uint(&mut data, "whitelist.delay", U256::from(delay), 2)?;
    }

    for (field, deposit) in [
        ("srcSafetyDeposit", params.src_safety_deposit),
        ("dstSafetyDeposit", params.dst_safety_deposit),
    ] {
        if deposit.bit_len() > 128 {
            return Err(SwapError::InvalidAmount {
                field,
                reason: "exceeds 128 bits".to_string(),
            });
        }
    }

    let dst_token = mapper.map_asset(&order.order_info.taker_asset)?;
    let deposits = (params.src_safety_deposit << 128usize) | params.dst_safety_deposit;
    let args = (
        params.hash_lock.as_b256(),
        U256::from(params.dst_chain.domain_chain_id()),
        dst_token,
        deposits,
        params.time_locks.pack(0),
    );
    data.extend_from_slice(&args.abi_encode());
    Ok(data)
}

fn permit(order: &CrossChainOrder) -> Result<Vec<u8>, SwapError> {
    match &order.extra.permit {
        Some(permit) => {
            let stripped = permit.strip_prefix("0x").unwrap_or(permit);
            hex::decode(stripped).map_err(|e| SwapError::InvalidHex {
                field: "permit",
                reason: e.to_string(),
            })
        }
        None => Ok(Vec::new()),
    }
}

/// Order extension: an offset table of cumulative field ends followed by
/// the concatenated fields.
fn extension(order: &CrossChainOrder, mapper: &dyn AddressMapper) -> Result<Vec<u8>, SwapError> {
    let factory = mapper.map_address(&order.escrow_factory)?;
    let amount_data = amount_data(order, factory)?;

    let mut fields: [Vec<u8>; EXTENSION_FIELDS] = Default::default();
    fields[MAKING_AMOUNT_DATA] = amount_data.clone();
    fields[TAKING_AMOUNT_DATA] = amount_data;
    fields[MAKER_PERMIT] = permit(order)?;
    fields[POST_INTERACTION_DATA] = post_interaction(order, factory, mapper)?;

    let mut offsets = U256::ZERO;
    let mut end = 0usize;
    for (index, field) in fields.iter().enumerate() {
        end += field.len();
        if end > u32::MAX as usize {
            return Err(SwapError::InvalidOrder("order extension too large".to_string()));
        }
        offsets |= U256::from(end) << (index * 32);
    }

    let mut extension = offsets.to_be_bytes::<32>().to_vec();
    for field in fields {
        extension.extend_from_slice(&field);
    }
    Ok(extension)
}

fn maker_traits(order: &CrossChainOrder) -> Result<U256, SwapError> {
    let extra = &order.extra;
    let auction = &order.details.auction;
    let flag = |bit: usize| U256::from(1u8) << bit;

    let mut traits = flag(HAS_EXTENSION_FLAG) | flag(POST_INTERACTION_CALL_FLAG);
    if !extra.allow_partial_fills.unwrap_or(true) {
        traits |= flag(NO_PARTIAL_FILLS_FLAG);
    }
    if extra.allow_multiple_fills.unwrap_or(true) {
        traits |= flag(ALLOW_MULTIPLE_FILLS_FLAG);
    }
    if extra.enable_permit2.unwrap_or_default() {
        traits |= flag(USE_PERMIT2_FLAG);
    }

    if let Some(delay) = extra.order_expiration_delay {
        let expiration = auction
            .start_time
            .checked_add(auction.duration)
            .and_then(|t| t.checked_add(delay))
            .filter(|t| *t < 1 << 40)
            .ok_or_else(|| {
                SwapError::InvalidOrder("order expiration does not fit 40 bits".to_string())
            })?;
        traits |= U256::from(expiration) << EXPIRATION_OFFSET;
    }

    let nonce = extra.nonce.unwrap_or_default();
    if nonce.bit_len() > 40 {
        return Err(SwapError::InvalidOrder(format!(
            "nonce {} exceeds 40 bits",
            nonce
        )));
    }
    traits |= nonce << NONCE_OFFSET;
    Ok(traits)
}

fn salt(order: &CrossChainOrder, extension: &[u8]) -> Result<U256, SwapError> {
    let salt = order.order_info.salt.unwrap_or_default();
    if salt.bit_len() > TRACK_CODE_OFFSET - SALT_OFFSET {
        return Err(SwapError::InvalidOrder(format!("salt {} exceeds 64 bits", salt)));
    }

    let extension_hash = U256::from_be_slice(&keccak256(extension)[12..]);
    let mut value = (salt << SALT_OFFSET) | extension_hash;
    if let Some(source) = &order.extra.source {
        let track_code = U256::from_be_slice(&keccak256(source.as_bytes())[..4]);
        value |= track_code << TRACK_CODE_OFFSET;
    }
    Ok(value)
}

fn limit_order(
    order: &CrossChainOrder,
    extension: &[u8],
    mapper: &dyn AddressMapper,
) -> Result<LimitOrder, SwapError> {
    let info = &order.order_info;
    let receiver = match &info.receiver {
        Some(receiver) => mapper.map_address(receiver)?,
        None => Address::ZERO,
    };

    Ok(LimitOrder {
        salt: salt(order, extension)?,
        maker: mapper.map_address(&info.maker)?,
        receiver,
        makerAsset: mapper.map_asset(&info.maker_asset)?,
        takerAsset: TRUE_ERC20,
        makingAmount: info.making_amount,
        takingAmount: info.taking_amount,
        makerTraits: maker_traits(order)?,
    })
}
