// Copyright (c) 2024 The Botho Foundation

//! Client error types.

use fusion_swap_core::SwapError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resolver answered with a non-2xx status and an `{error}` body.
    #[error("Resolver returned {status}: {message}")]
    Resolver { status: u16, message: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Swap(#[from] SwapError),
}

impl ClientError {
    /// HTTP status of a resolver rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Resolver { status, .. } => Some(*status),
            _ => None,
        }
    }
}
