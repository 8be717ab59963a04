// Copyright (c) 2024 The Botho Foundation

//! Per-escrow on-chain parameters.

use alloy::primitives::{B256, U256};

use crate::{
    error::SwapError,
    hashlock::HashLock,
    order::SignedCrossChainOrder,
    timelocks::{Stage, TimeLocks},
};

/// Which escrow of the pair an [`Immutables`] value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscrowSide {
    Src,
    Dst,
}

impl std::fmt::Display for EscrowSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscrowSide::Src => write!(f, "src"),
            EscrowSide::Dst => write!(f, "dst"),
        }
    }
}

/// The fixed parameters an escrow instance is deployed with.
///
/// `deployed_at` is the shared anchor of every time-lock window. It is taken
/// from the source escrow deployment and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Immutables {
    pub order_hash: B256,
    pub hash_lock: HashLock,
    pub maker: String,
    pub taker: String,
    pub token: String,
    pub token_id: Option<U256>,
    pub amount: U256,
    pub safety_deposit: U256,
    pub time_locks: TimeLocks,
    pub deployed_at: Option<u64>,
}

impl Immutables {
    /// Build the immutables of one side of `signed` with `taker` as the
    /// resolver's identity on that side's chain.
    pub fn for_side(
        signed: &SignedCrossChainOrder,
        side: EscrowSide,
        taker: impl Into<String>,
        deployed_at: Option<u64>,
    ) -> Self {
        let order = &signed.order;
        let info = &order.order_info;
        let params = &order.escrow_params;

        let (maker, asset, amount, safety_deposit) = match side {
            EscrowSide::Src => (
                info.maker.clone(),
                &info.maker_asset,
                info.making_amount,
                params.src_safety_deposit,
            ),
            EscrowSide::Dst => (
                info.receiver_or_maker().to_string(),
                &info.taker_asset,
                info.taking_amount,
                params.dst_safety_deposit,
            ),
        };

        Self {
            order_hash: signed.order_hash,
            hash_lock: params.hash_lock,
            maker,
            taker: taker.into(),
            token: asset.address.clone(),
            token_id: asset.token_id,
            amount,
            safety_deposit,
            time_locks: params.time_locks,
            deployed_at,
        }
    }

    /// Set the deployment anchor. Once set it can only be "set" again to the
    /// same value.
    pub fn set_deployed_at(&mut self, deployed_at: u64) -> Result<(), SwapError> {
        match self.deployed_at {
            Some(current) if current != deployed_at => Err(SwapError::DeployedAtImmutable {
                current,
                requested: deployed_at,
            }),
            _ => {
                self.deployed_at = Some(deployed_at);
                Ok(())
            }
        }
    }

    /// Absolute timestamp at which `stage` opens, once deployed.
    pub fn deadline(&self, stage: Stage) -> Option<u64> {
        self.deployed_at
            .map(|deployed_at| self.time_locks.deadline(deployed_at, stage))
    }

    /// Packed time-locks word, once deployed.
    pub fn packed_time_locks(&self) -> Option<U256> {
        self.deployed_at.map(|at| self.time_locks.pack(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::tests::sample_order;

    fn signed() -> SignedCrossChainOrder {
        SignedCrossChainOrder {
            order: sample_order(),
            signature: "0x00".to_string(),
            order_hash: B256::repeat_byte(0x11),
        }
    }

    #[test]
    fn test_src_side() {
        let signed = signed();
        let imm = Immutables::for_side(
            &signed,
            EscrowSide::Src,
            "0x4444444444444444444444444444444444444444",
            None,
        );

        assert_eq!(imm.order_hash, signed.order_hash);
        assert_eq!(imm.hash_lock, signed.order.escrow_params.hash_lock);
        assert_eq!(imm.maker, signed.order.order_info.maker);
        assert_eq!(imm.token, signed.order.order_info.maker_asset.address);
        assert_eq!(imm.amount, signed.order.order_info.making_amount);
        assert_eq!(imm.safety_deposit, signed.order.escrow_params.src_safety_deposit);
        assert_eq!(imm.deployed_at, None);
    }

    #[test]
    fn test_dst_side_shares_anchor_and_hashlock() {
        let signed = signed();
        let src = Immutables::for_side(
            &signed,
            EscrowSide::Src,
            "0x4444444444444444444444444444444444444444",
            Some(1_700_000_000),
        );
        let dst = Immutables::for_side(
            &signed,
            EscrowSide::Dst,
            "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb",
            src.deployed_at,
        );

        assert_eq!(dst.hash_lock, src.hash_lock);
        assert_eq!(dst.deployed_at, Some(1_700_000_000));
        assert_eq!(dst.maker, "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb");
        assert_eq!(dst.token, signed.order.order_info.taker_asset.address);
        assert_eq!(dst.amount, signed.order.order_info.taking_amount);
        assert_eq!(dst.safety_deposit, signed.order.escrow_params.dst_safety_deposit);
    }

    #[test]
    fn test_deployed_at_is_write_once() {
        let mut imm = Immutables::for_side(&signed(), EscrowSide::Src, "0x00", None);
        assert_eq!(imm.deadline(Stage::SrcCancellation), None);

        imm.set_deployed_at(100).unwrap();
        imm.set_deployed_at(100).unwrap();
        assert_eq!(
            imm.set_deployed_at(101),
            Err(SwapError::DeployedAtImmutable {
                current: 100,
                requested: 101
            })
        );
        assert_eq!(imm.deadline(Stage::SrcCancellation), Some(221));
    }
}
