// Copyright (c) 2024 The Botho Foundation

//! Wire representations of the order model.
//!
//! Every integer that may exceed 53 bits (amounts, deltas, timestamps,
//! nonces, deposits) travels as a canonical decimal string. Hashes travel as
//! 0x-prefixed hex. Conversions back into the model reject anything else.

use alloy::primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    chains::Chain,
    error::SwapError,
    hashlock::{decode_hex32, HashLock},
    immutables::Immutables,
    order::{
        Asset, AuctionDetails, AuctionGasCostInfo, AuctionPoint, CrossChainOrder,
        CrossChainOrderExtra, CrossChainOrderInfo, Details, EscrowParams, Fees, IntegratorFee,
        SignedCrossChainOrder, WhitelistItem,
    },
    timelocks::TimeLocks,
};

/// Parse a canonical decimal string: ASCII digits, no sign, no leading zeros.
pub fn parse_u256(field: &'static str, value: &str) -> Result<U256, SwapError> {
    let invalid = || SwapError::InvalidNumber {
        field,
        value: value.to_string(),
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if value.len() > 1 && value.starts_with('0') {
        return Err(invalid());
    }
    U256::from_str_radix(value, 10).map_err(|_| invalid())
}

pub fn parse_u64(field: &'static str, value: &str) -> Result<u64, SwapError> {
    let wide = parse_u256(field, value)?;
    if wide > U256::from(u64::MAX) {
        return Err(SwapError::InvalidNumber {
            field,
            value: value.to_string(),
        });
    }
    Ok(wide.as_limbs()[0])
}

fn parse_opt_u256(field: &'static str, value: Option<&str>) -> Result<Option<U256>, SwapError> {
    value.map(|v| parse_u256(field, v)).transpose()
}

fn parse_opt_u64(field: &'static str, value: Option<&str>) -> Result<Option<u64>, SwapError> {
    value.map(|v| parse_u64(field, v)).transpose()
}

pub fn parse_b256(field: &'static str, value: &str) -> Result<B256, SwapError> {
    if !value.starts_with("0x") {
        return Err(SwapError::InvalidHex {
            field,
            reason: "missing 0x prefix".to_string(),
        });
    }
    decode_hex32(field, value).map(B256::from)
}

pub fn format_b256(value: &B256) -> String {
    format!("0x{}", hex::encode(value))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLocksDto {
    pub src_withdrawal: String,
    pub src_public_withdrawal: String,
    pub src_cancellation: String,
    pub src_public_cancellation: String,
    pub dst_withdrawal: String,
    pub dst_public_withdrawal: String,
    pub dst_cancellation: String,
}

impl From<&TimeLocks> for TimeLocksDto {
    fn from(t: &TimeLocks) -> Self {
        Self {
            src_withdrawal: t.src_withdrawal.to_string(),
            src_public_withdrawal: t.src_public_withdrawal.to_string(),
            src_cancellation: t.src_cancellation.to_string(),
            src_public_cancellation: t.src_public_cancellation.to_string(),
            dst_withdrawal: t.dst_withdrawal.to_string(),
            dst_public_withdrawal: t.dst_public_withdrawal.to_string(),
            dst_cancellation: t.dst_cancellation.to_string(),
        }
    }
}

impl TryFrom<TimeLocksDto> for TimeLocks {
    type Error = SwapError;

    fn try_from(d: TimeLocksDto) -> Result<Self, Self::Error> {
        Ok(Self {
            src_withdrawal: parse_u64("srcWithdrawal", &d.src_withdrawal)?,
            src_public_withdrawal: parse_u64("srcPublicWithdrawal", &d.src_public_withdrawal)?,
            src_cancellation: parse_u64("srcCancellation", &d.src_cancellation)?,
            src_public_cancellation: parse_u64(
                "srcPublicCancellation",
                &d.src_public_cancellation,
            )?,
            dst_withdrawal: parse_u64("dstWithdrawal", &d.dst_withdrawal)?,
            dst_public_withdrawal: parse_u64("dstPublicWithdrawal", &d.dst_public_withdrawal)?,
            dst_cancellation: parse_u64("dstCancellation", &d.dst_cancellation)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

impl From<&Asset> for AssetDto {
    fn from(a: &Asset) -> Self {
        Self {
            address: a.address.clone(),
            token_id: a.token_id.map(|id| id.to_string()),
        }
    }
}

impl TryFrom<AssetDto> for Asset {
    type Error = SwapError;

    fn try_from(d: AssetDto) -> Result<Self, Self::Error> {
        Ok(Self {
            address: d.address,
            token_id: parse_opt_u256("tokenId", d.token_id.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainOrderInfoDto {
    pub maker_asset: AssetDto,
    pub taker_asset: AssetDto,
    pub making_amount: String,
    pub taking_amount: String,
    pub maker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl From<&CrossChainOrderInfo> for CrossChainOrderInfoDto {
    fn from(i: &CrossChainOrderInfo) -> Self {
        Self {
            maker_asset: (&i.maker_asset).into(),
            taker_asset: (&i.taker_asset).into(),
            making_amount: i.making_amount.to_string(),
            taking_amount: i.taking_amount.to_string(),
            maker: i.maker.clone(),
            salt: i.salt.map(|s| s.to_string()),
            receiver: i.receiver.clone(),
        }
    }
}

impl TryFrom<CrossChainOrderInfoDto> for CrossChainOrderInfo {
    type Error = SwapError;

    fn try_from(d: CrossChainOrderInfoDto) -> Result<Self, Self::Error> {
        Ok(Self {
            maker_asset: d.maker_asset.try_into()?,
            taker_asset: d.taker_asset.try_into()?,
            making_amount: parse_u256("makingAmount", &d.making_amount)?,
            taking_amount: parse_u256("takingAmount", &d.taking_amount)?,
            maker: d.maker,
            receiver: d.receiver,
            salt: parse_opt_u256("salt", d.salt.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowParamsDto {
    pub hash_lock: String,
    pub src_chain_id: Chain,
    pub dst_chain_id: Chain,
    pub src_safety_deposit: String,
    pub dst_safety_deposit: String,
    pub time_locks: TimeLocksDto,
}

impl From<&EscrowParams> for EscrowParamsDto {
    fn from(p: &EscrowParams) -> Self {
        Self {
            hash_lock: p.hash_lock.to_string(),
            src_chain_id: p.src_chain,
            dst_chain_id: p.dst_chain,
            src_safety_deposit: p.src_safety_deposit.to_string(),
            dst_safety_deposit: p.dst_safety_deposit.to_string(),
            time_locks: (&p.time_locks).into(),
        }
    }
}

impl TryFrom<EscrowParamsDto> for EscrowParams {
    type Error = SwapError;

    fn try_from(d: EscrowParamsDto) -> Result<Self, Self::Error> {
        Ok(Self {
            hash_lock: HashLock(parse_b256("hashLock", &d.hash_lock)?),
            src_chain: d.src_chain_id,
            dst_chain: d.dst_chain_id,
            src_safety_deposit: parse_u256("srcSafetyDeposit", &d.src_safety_deposit)?,
            dst_safety_deposit: parse_u256("dstSafetyDeposit", &d.dst_safety_deposit)?,
            time_locks: d.time_locks.try_into()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionPointDto {
    pub delay: u32,
    pub coefficient: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionGasCostInfoDto {
    pub gas_bump_estimate: String,
    pub gas_price_estimate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDetailsDto {
    pub start_time: String,
    pub initial_rate_bump: u32,
    pub duration: String,
    pub points: Vec<AuctionPointDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_cost: Option<AuctionGasCostInfoDto>,
}

impl From<&AuctionDetails> for AuctionDetailsDto {
    fn from(a: &AuctionDetails) -> Self {
        Self {
            start_time: a.start_time.to_string(),
            initial_rate_bump: a.initial_rate_bump,
            duration: a.duration.to_string(),
            points: a
                .points
                .iter()
                .map(|p| AuctionPointDto {
                    delay: p.delay,
                    coefficient: p.coefficient,
                })
                .collect(),
            gas_cost: a.gas_cost.map(|g| AuctionGasCostInfoDto {
                gas_bump_estimate: g.gas_bump_estimate.to_string(),
                gas_price_estimate: g.gas_price_estimate.to_string(),
            }),
        }
    }
}

impl TryFrom<AuctionDetailsDto> for AuctionDetails {
    type Error = SwapError;

    fn try_from(d: AuctionDetailsDto) -> Result<Self, Self::Error> {
        let gas_cost = match d.gas_cost {
            Some(g) => Some(AuctionGasCostInfo {
                gas_bump_estimate: parse_u256("gasBumpEstimate", &g.gas_bump_estimate)?,
                gas_price_estimate: parse_u256("gasPriceEstimate", &g.gas_price_estimate)?,
            }),
            None => None,
        };
        Ok(Self {
            start_time: parse_u64("startTime", &d.start_time)?,
            initial_rate_bump: d.initial_rate_bump,
            duration: parse_u64("duration", &d.duration)?,
            points: d
                .points
                .into_iter()
                .map(|p| AuctionPoint {
                    delay: p.delay,
                    coefficient: p.coefficient,
                })
                .collect(),
            gas_cost,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorFeeDto {
    pub ratio: String,
    pub receiver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrator_fee: Option<IntegratorFeeDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_fee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistItemDto {
    pub address: String,
    pub allow_from: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsDto {
    pub auction: AuctionDetailsDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<FeesDto>,
    pub whitelist: Vec<WhitelistItemDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolving_start_time: Option<String>,
}

impl From<&Details> for DetailsDto {
    fn from(d: &Details) -> Self {
        Self {
            auction: (&d.auction).into(),
            fees: d.fees.as_ref().map(|f| FeesDto {
                integrator_fee: f.integrator_fee.as_ref().map(|i| IntegratorFeeDto {
                    ratio: i.ratio.to_string(),
                    receiver: i.receiver.clone(),
                }),
                bank_fee: f.bank_fee.map(|b| b.to_string()),
            }),
            whitelist: d
                .whitelist
                .iter()
                .map(|w| WhitelistItemDto {
                    address: w.address.clone(),
                    allow_from: w.allow_from.to_string(),
                })
                .collect(),
            resolving_start_time: d.resolving_start_time.map(|t| t.to_string()),
        }
    }
}

impl TryFrom<DetailsDto> for Details {
    type Error = SwapError;

    fn try_from(d: DetailsDto) -> Result<Self, Self::Error> {
        let fees = match d.fees {
            Some(f) => Some(Fees {
                integrator_fee: match f.integrator_fee {
                    Some(i) => Some(IntegratorFee {
                        ratio: parse_u256("integratorFee.ratio", &i.ratio)?,
                        receiver: i.receiver,
                    }),
                    None => None,
                },
                bank_fee: parse_opt_u256("bankFee", f.bank_fee.as_deref())?,
            }),
            None => None,
        };

        let whitelist = d
            .whitelist
            .into_iter()
            .map(|w| {
                Ok(WhitelistItem {
                    allow_from: parse_u64("allowFrom", &w.allow_from)?,
                    address: w.address,
                })
            })
            .collect::<Result<Vec<_>, SwapError>>()?;

        Ok(Self {
            auction: d.auction.try_into()?,
            fees,
            whitelist,
            resolving_start_time: parse_opt_u64(
                "resolvingStartTime",
                d.resolving_start_time.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainOrderExtraDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_expiration_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_permit2: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_multiple_fills: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_partial_fills: Option<bool>,
}

impl From<&CrossChainOrderExtra> for CrossChainOrderExtraDto {
    fn from(e: &CrossChainOrderExtra) -> Self {
        Self {
            nonce: e.nonce.map(|n| n.to_string()),
            permit: e.permit.clone(),
            order_expiration_delay: e.order_expiration_delay.map(|d| d.to_string()),
            enable_permit2: e.enable_permit2,
            source: e.source.clone(),
            allow_multiple_fills: e.allow_multiple_fills,
            allow_partial_fills: e.allow_partial_fills,
        }
    }
}

impl TryFrom<CrossChainOrderExtraDto> for CrossChainOrderExtra {
    type Error = SwapError;

    fn try_from(d: CrossChainOrderExtraDto) -> Result<Self, Self::Error> {
        Ok(Self {
            nonce: parse_opt_u256("nonce", d.nonce.as_deref())?,
            permit: d.permit,
            order_expiration_delay: parse_opt_u64(
                "orderExpirationDelay",
                d.order_expiration_delay.as_deref(),
            )?,
            enable_permit2: d.enable_permit2,
            source: d.source,
            allow_multiple_fills: d.allow_multiple_fills,
            allow_partial_fills: d.allow_partial_fills,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainOrderDto {
    pub escrow_factory: String,
    pub order_info: CrossChainOrderInfoDto,
    pub escrow_params: EscrowParamsDto,
    pub details: DetailsDto,
    #[serde(default)]
    pub extra: CrossChainOrderExtraDto,
}

impl From<&CrossChainOrder> for CrossChainOrderDto {
    fn from(o: &CrossChainOrder) -> Self {
        Self {
            escrow_factory: o.escrow_factory.clone(),
            order_info: (&o.order_info).into(),
            escrow_params: (&o.escrow_params).into(),
            details: (&o.details).into(),
            extra: (&o.extra).into(),
        }
    }
}

impl TryFrom<CrossChainOrderDto> for CrossChainOrder {
    type Error = SwapError;

    fn try_from(d: CrossChainOrderDto) -> Result<Self, Self::Error> {
        Ok(Self {
            escrow_factory: d.escrow_factory,
            order_info: d.order_info.try_into()?,
            escrow_params: d.escrow_params.try_into()?,
            details: d.details.try_into()?,
            extra: d.extra.try_into()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCrossChainOrderDto {
    pub order: CrossChainOrderDto,
    pub signature: String,
    pub order_hash: String,
}

impl From<&SignedCrossChainOrder> for SignedCrossChainOrderDto {
    fn from(s: &SignedCrossChainOrder) -> Self {
        Self {
            order: (&s.order).into(),
            signature: s.signature.clone(),
            order_hash: format_b256(&s.order_hash),
        }
    }
}

impl TryFrom<SignedCrossChainOrderDto> for SignedCrossChainOrder {
    type Error = SwapError;

    fn try_from(d: SignedCrossChainOrderDto) -> Result<Self, Self::Error> {
        Ok(Self {
            order: d.order.try_into()?,
            signature: d.signature,
            order_hash: parse_b256("orderHash", &d.order_hash)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImmutablesDto {
    pub order_hash: String,
    pub hash_lock: String,
    pub maker: String,
    pub taker: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub amount: String,
    pub safety_deposit: String,
    pub time_locks: TimeLocksDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<String>,
}

impl From<&Immutables> for ImmutablesDto {
    fn from(i: &Immutables) -> Self {
        Self {
            order_hash: format_b256(&i.order_hash),
            hash_lock: i.hash_lock.to_string(),
            maker: i.maker.clone(),
            taker: i.taker.clone(),
            token: i.token.clone(),
            token_id: i.token_id.map(|id| id.to_string()),
            amount: i.amount.to_string(),
            safety_deposit: i.safety_deposit.to_string(),
            time_locks: (&i.time_locks).into(),
            deployed_at: i.deployed_at.map(|t| t.to_string()),
        }
    }
}

impl TryFrom<ImmutablesDto> for Immutables {
    type Error = SwapError;

    fn try_from(d: ImmutablesDto) -> Result<Self, Self::Error> {
        Ok(Self {
            order_hash: parse_b256("orderHash", &d.order_hash)?,
            hash_lock: HashLock(parse_b256("hashLock", &d.hash_lock)?),
            maker: d.maker,
            taker: d.taker,
            token: d.token,
            token_id: parse_opt_u256("tokenId", d.token_id.as_deref())?,
            amount: parse_u256("amount", &d.amount)?,
            safety_deposit: parse_u256("safetyDeposit", &d.safety_deposit)?,
            time_locks: d.time_locks.try_into()?,
            deployed_at: parse_opt_u64("deployedAt", d.deployed_at.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{immutables::EscrowSide, order::tests::sample_order};

    fn big_order() -> CrossChainOrder {
        let mut order = sample_order();
        // Well beyond 2^53
        order.order_info.making_amount =
            U256::from_str_radix("123456789012345678901234567890", 10).unwrap();
        order.order_info.taker_asset.token_id = Some(U256::from(9_007_199_254_740_993u64));
        order.escrow_params.src_safety_deposit = U256::MAX;
        order.details.auction.start_time = u64::MAX;
        order.details.auction.gas_cost = Some(AuctionGasCostInfo {
            gas_bump_estimate: U256::from(1u64) << 200usize,
            gas_price_estimate: U256::from(7u64),
        });
        order.details.fees = Some(Fees {
            integrator_fee: Some(IntegratorFee {
                ratio: U256::from(5u64),
                receiver: "0x5555555555555555555555555555555555555555".to_string(),
            }),
            bank_fee: Some(U256::from(3u64)),
        });
        order.details.auction.points = vec![AuctionPoint {
            delay: 10,
            coefficient: 20,
        }];
        order.extra.order_expiration_delay = Some(12);
        order
    }

    #[test]
    fn test_order_round_trip_preserves_large_integers() {
        let signed = SignedCrossChainOrder {
            order: big_order(),
            signature: "0xdeadbeef".to_string(),
            order_hash: B256::repeat_byte(0xab),
        };

        let dto = SignedCrossChainOrderDto::from(&signed);
        assert_eq!(dto.order.order_info.making_amount, "123456789012345678901234567890");
        assert_eq!(
            dto.order.order_info.taker_asset.token_id.as_deref(),
            Some("9007199254740993")
        );

        let json = serde_json::to_string(&dto).unwrap();
        let back: SignedCrossChainOrderDto = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dto);

        let model = SignedCrossChainOrder::try_from(back).unwrap();
        assert_eq!(model, signed);
        assert_eq!(SignedCrossChainOrderDto::from(&model), dto);
    }

    #[test]
    fn test_wire_field_names() {
        let dto = CrossChainOrderDto::from(&sample_order());
        let json = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["escrowParams"]["srcChainId"], 1);
        assert_eq!(json["escrowParams"]["dstChainId"], "tezos:ghostnet");
        assert_eq!(json["escrowParams"]["timeLocks"]["srcPublicWithdrawal"], "120");
        assert_eq!(json["orderInfo"]["makingAmount"], "100000000");
        assert!(json["orderInfo"]["makerAsset"].get("tokenId").is_none());
        assert_eq!(json["details"]["auction"]["initialRateBump"], 0);
    }

    #[test]
    fn test_immutables_round_trip() {
        let signed = SignedCrossChainOrder {
            order: big_order(),
            signature: "0x".to_string(),
            order_hash: B256::repeat_byte(1),
        };
        let imm = Immutables::for_side(
            &signed,
            EscrowSide::Dst,
            "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb",
            Some(1_700_000_000),
        );

        let dto = ImmutablesDto::from(&imm);
        assert_eq!(dto.deployed_at.as_deref(), Some("1700000000"));
        assert_eq!(Immutables::try_from(dto.clone()).unwrap(), imm);

        let undeployed = Immutables {
            deployed_at: None,
            ..imm
        };
        let dto = ImmutablesDto::from(&undeployed);
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("deployedAt").is_none());
        assert_eq!(Immutables::try_from(dto).unwrap(), undeployed);
    }

    #[test]
    fn test_non_canonical_numbers_rejected() {
        assert!(parse_u256("amount", "").is_err());
        assert!(parse_u256("amount", "-1").is_err());
        assert!(parse_u256("amount", "1.5").is_err());
        assert!(parse_u256("amount", "007").is_err());
        assert!(parse_u256("amount", "1e6").is_err());
        assert_eq!(parse_u256("amount", "0").unwrap(), U256::ZERO);
        assert!(parse_u64("delay", "18446744073709551616").is_err());
    }

    #[test]
    fn test_hash_fields_require_prefix() {
        assert!(parse_b256("orderHash", &"ab".repeat(32)).is_err());
        assert!(parse_b256("orderHash", &format!("0x{}", "ab".repeat(31))).is_err());
        assert!(parse_b256("orderHash", &format!("0x{}", "ab".repeat(32))).is_ok());
    }

    #[test]
    fn test_timelock_dto_rejects_numbers() {
        let json = r#"{
            "srcWithdrawal": 0, "srcPublicWithdrawal": "120", "srcCancellation": "121",
            "srcPublicCancellation": "122", "dstWithdrawal": "0",
            "dstPublicWithdrawal": "100", "dstCancellation": "101"
        }"#;
        assert!(serde_json::from_str::<TimeLocksDto>(json).is_err());
    }
}
