// Copyright (c) 2024 The Botho Foundation

//! Escrow adapters, one per supported chain.

pub mod evm;
pub mod tezos;

pub use evm::EvmEscrowService;
pub use tezos::TezosEscrowService;
