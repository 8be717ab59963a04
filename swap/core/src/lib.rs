// Copyright (c) 2024 The Botho Foundation

//! Core types and logic for HTLC cross-chain swaps.
//!
//! This crate provides the domain types shared by the swap client and the
//! resolver service, including:
//!
//! - Time-locks, hash-locks and swap secrets
//! - Cross-chain orders, escrow immutables and their wire DTOs
//! - Order hashing, cross-chain address mapping and order signing
//! - The limit order form of EVM-sourced orders
//! - The order builder used by makers
//! - The escrow capability interface implemented per chain

pub mod api;
pub mod builder;
pub mod chains;
pub mod clock;
pub mod dto;
pub mod error;
pub mod escrow;
pub mod hashing;
pub mod hashlock;
pub mod immutables;
pub mod limit_order;
pub mod order;
pub mod signing;
pub mod tezos;
pub mod timelocks;
pub mod tokens;

pub use alloy::primitives::{Address, B256, U256};

pub use builder::{BlockClock, OrderBuilder, OrderPolicy, PreparedOrder, SwapRequest};
pub use chains::{Chain, ChainAddress};
pub use clock::{Clock, SystemClock};
pub use error::{ChainError, SwapError};
pub use escrow::{DstDeployment, EscrowChainService, SrcDeployment, TransactionRecord};
pub use hashing::{AddressMapper, Eip712OrderHasher, KeccakAddressMapper, OrderHasher};
pub use hashlock::{HashLock, Secret};
pub use immutables::{EscrowSide, Immutables};
pub use limit_order::{LimitOrder, LimitOrderParts, LIMIT_ORDER_PROTOCOL};
pub use order::{
    Asset, AuctionDetails, AuctionGasCostInfo, AuctionPoint, CrossChainOrder,
    CrossChainOrderExtra, CrossChainOrderInfo, Details, EscrowParams, Fees, IntegratorFee,
    SignedCrossChainOrder, WhitelistItem,
};
pub use signing::{EvmOrderSigner, OrderSigner, TezosOrderSigner};
pub use timelocks::{Stage, TimeLocks};
pub use tokens::{Token, TokenKind, TokenRegistry};

/// Digest identifying an order, scoped to its source chain.
pub type OrderHash = B256;
