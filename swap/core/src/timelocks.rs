// Copyright (c) 2024 The Botho Foundation

//! Time-lock windows of an escrow pair.
//!
//! All seven values are delays in seconds relative to the moment the source
//! escrow was deployed. The anchor itself (`deployedAt`) lives in
//! [`crate::Immutables`] and is only known after deployment.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// A time-lock stage, in on-chain packing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SrcWithdrawal,
    SrcPublicWithdrawal,
    SrcCancellation,
    SrcPublicCancellation,
    DstWithdrawal,
    DstPublicWithdrawal,
    DstCancellation,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::SrcWithdrawal,
        Stage::SrcPublicWithdrawal,
        Stage::SrcCancellation,
        Stage::SrcPublicCancellation,
        Stage::DstWithdrawal,
        Stage::DstPublicWithdrawal,
        Stage::DstCancellation,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::SrcWithdrawal => "src_withdrawal",
            Stage::SrcPublicWithdrawal => "src_public_withdrawal",
            Stage::SrcCancellation => "src_cancellation",
            Stage::SrcPublicCancellation => "src_public_cancellation",
            Stage::DstWithdrawal => "dst_withdrawal",
            Stage::DstPublicWithdrawal => "dst_public_withdrawal",
            Stage::DstCancellation => "dst_cancellation",
        };
        write!(f, "{}", name)
    }
}

/// Bit offset of `deployedAt` in the packed word.
const DEPLOYED_AT_OFFSET: usize = 224;

/// Delays (seconds) of every escrow stage, relative to `deployedAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeLocks {
    pub src_withdrawal: u64,
    pub src_public_withdrawal: u64,
    pub src_cancellation: u64,
    pub src_public_cancellation: u64,
    pub dst_withdrawal: u64,
    pub dst_public_withdrawal: u64,
    pub dst_cancellation: u64,
}

impl TimeLocks {
    /// Check that both sides are strictly increasing and that every delay
    /// fits the 32-bit slot it occupies on-chain.
    pub fn validate(&self) -> Result<(), SwapError> {
        for stage in Stage::ALL {
            let delay = self.delay(stage);
            if delay > u64::from(u32::MAX) {
                return Err(SwapError::InvalidTimeLocks(format!(
                    "{} delay {} exceeds 32 bits",
                    stage, delay
                )));
            }
        }

        let src = [
            Stage::SrcWithdrawal,
            Stage::SrcPublicWithdrawal,
            Stage::SrcCancellation,
            Stage::SrcPublicCancellation,
        ];
        let dst = [
            Stage::DstWithdrawal,
            Stage::DstPublicWithdrawal,
            Stage::DstCancellation,
        ];

        for side in [&src[..], &dst[..]] {
            for pair in side.windows(2) {
                let (earlier, later) = (pair[0], pair[1]);
                if self.delay(earlier) >= self.delay(later) {
                    return Err(SwapError::InvalidTimeLocks(format!(
                        "{} ({}) must be before {} ({})",
                        earlier,
                        self.delay(earlier),
                        later,
                        self.delay(later)
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn delay(&self, stage: Stage) -> u64 {
        match stage {
            Stage::SrcWithdrawal => self.src_withdrawal,
            Stage::SrcPublicWithdrawal => self.src_public_withdrawal,
            Stage::SrcCancellation => self.src_cancellation,
            Stage::SrcPublicCancellation => self.src_public_cancellation,
            Stage::DstWithdrawal => self.dst_withdrawal,
            Stage::DstPublicWithdrawal => self.dst_public_withdrawal,
            Stage::DstCancellation => self.dst_cancellation,
        }
    }

    /// Absolute unix timestamp (seconds) at which `stage` opens.
    pub fn deadline(&self, deployed_at: u64, stage: Stage) -> u64 {
        deployed_at.saturating_add(self.delay(stage))
    }

    /// Pack into the 256-bit word used by the EVM escrow contracts.
    pub fn pack(&self, deployed_at: u64) -> U256 {
        let mut word = U256::from(deployed_at & u64::from(u32::MAX)) << DEPLOYED_AT_OFFSET;
        for stage in Stage::ALL {
            let delay = self.delay(stage) & u64::from(u32::MAX);
            word |= U256::from(delay) << (32 * stage.index());
        }
        word
    }

    /// Inverse of [`TimeLocks::pack`]. Returns the delays and `deployedAt`.
    pub fn unpack(word: U256) -> (TimeLocks, u64) {
        let mask = U256::from(u32::MAX);
        let slot = |offset: usize| ((word >> offset) & mask).as_limbs()[0];

        let locks = TimeLocks {
            src_withdrawal: slot(0),
            src_public_withdrawal: slot(32),
            src_cancellation: slot(64),
            src_public_cancellation: slot(96),
            dst_withdrawal: slot(128),
            dst_public_withdrawal: slot(160),
            dst_cancellation: slot(192),
        };
        (locks, slot(DEPLOYED_AT_OFFSET))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_locks() -> TimeLocks {
        TimeLocks {
            src_withdrawal: 0,
            src_public_withdrawal: 120,
            src_cancellation: 121,
            src_public_cancellation: 122,
            dst_withdrawal: 0,
            dst_public_withdrawal: 100,
            dst_cancellation: 101,
        }
    }

    #[test]
    fn test_valid_timelocks() {
        assert!(default_locks().validate().is_ok());
    }

    #[test]
    fn test_src_ordering_enforced() {
        let mut locks = default_locks();
        locks.src_cancellation = 120;
        assert!(matches!(
            locks.validate(),
            Err(SwapError::InvalidTimeLocks(_))
        ));

        let mut locks = default_locks();
        locks.src_public_cancellation = 10;
        assert!(locks.validate().is_err());
    }

    #[test]
    fn test_dst_ordering_enforced() {
        let mut locks = default_locks();
        locks.dst_withdrawal = 100;
        assert!(locks.validate().is_err());

        let mut locks = default_locks();
        locks.dst_cancellation = 50;
        assert!(locks.validate().is_err());
    }

    #[test]
    fn test_delay_must_fit_u32() {
        let mut locks = default_locks();
        locks.src_public_cancellation = u64::from(u32::MAX) + 1;
        assert!(locks.validate().is_err());
    }

    #[test]
    fn test_deadline() {
        let locks = default_locks();
        assert_eq!(locks.deadline(1_700_000_000, Stage::SrcCancellation), 1_700_000_121);
        assert_eq!(locks.deadline(1_700_000_000, Stage::DstWithdrawal), 1_700_000_000);
    }

    #[test]
    fn test_pack_layout() {
        let locks = default_locks();
        let word = locks.pack(7);

        assert_eq!(word & U256::from(u32::MAX), U256::ZERO);
        assert_eq!((word >> 32usize) & U256::from(u32::MAX), U256::from(120u64));
        assert_eq!((word >> 192usize) & U256::from(u32::MAX), U256::from(101u64));
        assert_eq!(word >> 224usize, U256::from(7u64));
    }

    #[test]
    fn test_unpack_recovers_fields() {
        let locks = default_locks();
        let (unpacked, deployed_at) = TimeLocks::unpack(locks.pack(1_700_000_000));
        assert_eq!(unpacked, locks);
        assert_eq!(deployed_at, 1_700_000_000);
    }
}
