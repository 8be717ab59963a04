// Copyright (c) 2024 The Botho Foundation

//! Maker client for HTLC swaps between Ethereum and Tezos.
//!
//! Builds and signs cross-chain orders, submits them to a resolver and
//! later reveals the swap secret (or asks for cancellation).

pub mod config;
pub mod error;
pub mod evm_clock;
pub mod resolver_client;
pub mod swap_manager;

pub use config::ClientConfig;
pub use error::ClientError;
pub use evm_clock::EvmBlockClock;
pub use resolver_client::ResolverClient;
pub use swap_manager::{AssetDescriptor, SwapManager, SwapReceipt};
