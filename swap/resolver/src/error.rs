// Copyright (c) 2024 The Botho Foundation

//! Resolver errors and their taxonomy.

use std::time::Duration;

use fusion_swap_core::{Chain, ChainError, OrderHash, SwapError};

use crate::context::OrderStatus;

/// Coarse classification of a [`ResolverError`], used by callers to decide
/// whether a request can be retried and by the HTTP layer to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or unsupported request, rejected before any network call
    Validation,
    /// Order hash, signature or secret does not match its commitment
    Integrity,
    NotFound,
    /// The order exists but is in the wrong state, or is being processed
    Conflict,
    /// A time-lock window has not opened yet
    TooEarly,
    /// RPC failure or reverted transaction
    Transaction,
    /// No confirmation within the configured bound
    Timeout,
    /// A path that is deliberately not built
    NotImplemented,
}

impl ErrorCategory {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCategory::Validation => 400,
            ErrorCategory::Integrity => 422,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::TooEarly => 425,
            ErrorCategory::Transaction => 502,
            ErrorCategory::Timeout => 504,
            ErrorCategory::NotImplemented => 501,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error(transparent)]
    Validation(#[from] SwapError),

    #[error("Unsupported swap direction: {src} -> {dst}")]
    UnsupportedDirection { src: Chain, dst: Chain },

    #[error("Order hash mismatch: expected {claimed}, got {computed}")]
    OrderHashMismatch {
        claimed: OrderHash,
        computed: OrderHash,
    },

    #[error("Invalid order signature: {0}")]
    InvalidSignature(String),

    #[error("Secret does not match the hash-lock of order {0}")]
    SecretMismatch(OrderHash),

    #[error("Deployed escrow does not match order {order_hash}: {reason}")]
    EscrowMismatch {
        order_hash: OrderHash,
        reason: String,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(OrderHash),

    #[error("Order {0} was already submitted")]
    DuplicateOrder(OrderHash),

    #[error("Order {0} is being processed by another request")]
    OrderBusy(OrderHash),

    #[error("Order {order_hash} cannot move from {from} to {to}")]
    InvalidTransition {
        order_hash: OrderHash,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Cancellation of order {order_hash} is pending until {opens_at}")]
    CancellationPending { order_hash: OrderHash, opens_at: u64 },

    #[error("Swap rejected: {0}")]
    SwapRejected(String),

    #[error("{chain} {operation} failed: {source}")]
    Chain {
        chain: Chain,
        operation: &'static str,
        #[source]
        source: ChainError,
    },

    #[error("{chain} {operation} not confirmed after {after:?}")]
    Timeout {
        chain: Chain,
        operation: &'static str,
        after: Duration,
    },
}

impl ResolverError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ResolverError::Validation(_)
            | ResolverError::UnsupportedDirection { .. }
            | ResolverError::SwapRejected(_) => ErrorCategory::Validation,
            ResolverError::OrderHashMismatch { .. }
            | ResolverError::InvalidSignature(_)
            | ResolverError::SecretMismatch(_)
            | ResolverError::EscrowMismatch { .. } => ErrorCategory::Integrity,
            ResolverError::OrderNotFound(_) => ErrorCategory::NotFound,
            ResolverError::DuplicateOrder(_)
            | ResolverError::OrderBusy(_)
            | ResolverError::InvalidTransition { .. } => ErrorCategory::Conflict,
            ResolverError::CancellationPending { .. } => ErrorCategory::TooEarly,
            ResolverError::Chain { source, .. } if source.is_not_supported() => {
                ErrorCategory::NotImplemented
            }
            ResolverError::Chain { .. } => ErrorCategory::Transaction,
            ResolverError::Timeout { .. } => ErrorCategory::Timeout,
        }
    }
}
