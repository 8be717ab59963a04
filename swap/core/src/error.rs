// Copyright (c) 2024 The Botho Foundation

//! Error types shared across the swap crates.

use crate::chains::Chain;

/// Validation and model errors raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Unsupported chain combination: {src} -> {dst}")]
    UnsupportedRoute { src: Chain, dst: Chain },

    #[error("Token {symbol} not found on {chain}")]
    TokenNotFound { chain: Chain, symbol: String },

    #[error("Native token {symbol} on {chain} cannot be used as a swap leg")]
    NativeTokenUnsupported { chain: Chain, symbol: String },

    #[error("Invalid time-locks: {0}")]
    InvalidTimeLocks(String),

    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("Invalid {chain} address {address:?}: {reason}")]
    InvalidAddress {
        chain: Chain,
        address: String,
        reason: String,
    },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Deployment timestamp already set to {current}, refusing to change it to {requested}")]
    DeployedAtImmutable { current: u64, requested: u64 },

    #[error("Block clock error: {0}")]
    Clock(String),
}

/// Errors surfaced by a chain escrow adapter.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction {tx} reverted: {reason}")]
    Reverted { tx: String, reason: String },

    #[error("Malformed chain response: {0}")]
    MalformedResponse(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error(transparent)]
    Model(#[from] SwapError),
}

impl ChainError {
    /// Whether this error marks a capability the adapter does not provide,
    /// as opposed to a failed network or transaction call.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, ChainError::NotSupported(_))
    }
}
