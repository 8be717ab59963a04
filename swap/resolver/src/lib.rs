// Copyright (c) 2024 The Botho Foundation

//! Resolver service for HTLC cross-chain swaps.
//!
//! The [`Resolver`] owns every accepted order and drives the two chain
//! adapters through `deploy_src -> deploy_dst -> withdraw` (or `cancel`).
//! Chain access goes through [`fusion_swap_core::EscrowChainService`]; the
//! EVM and Tezos implementations live in [`chains`].

pub mod api;
pub mod chains;
pub mod config;
pub mod context;
pub mod error;
pub mod resolver;

pub use config::ResolverConfig;
pub use context::{OrderContext, OrderStatus, OrderStatusView};
pub use error::{ErrorCategory, ResolverError};
pub use resolver::{
    AllowAll, CancelOutcome, FinalizeOutcome, Resolver, StartSwapOutcome, SwapGate,
};
