// Copyright (c) 2024 The Botho Foundation

//! Request and response bodies of the resolver HTTP surface.
//!
//! Shared by the resolver service and its client so both sides agree on the
//! exact JSON shape.

use serde::{Deserialize, Serialize};

use crate::escrow::TransactionRecord;

/// A confirmed transaction as reported over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDto {
    pub hash: String,
    pub block: String,
    /// Unix seconds, decimal string
    pub timestamp: String,
}

impl From<&TransactionRecord> for TransactionDto {
    fn from(tx: &TransactionRecord) -> Self {
        Self {
            hash: tx.hash.clone(),
            block: tx.block.clone(),
            timestamp: tx.timestamp.to_string(),
        }
    }
}

/// Response to `POST /resolver/order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSwapResponse {
    pub src_escrow_tx: TransactionDto,
    pub src_escrow_address: String,
    pub dst_escrow_tx: TransactionDto,
    pub dst_escrow_address: String,
}

/// Body of `POST /resolver/order/{orderHash}/withdraw`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawRequest {
    /// 0x-prefixed 32-byte hex
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeSwapResponse {
    pub src_withdrawal_tx: TransactionDto,
    pub dst_withdrawal_tx: TransactionDto,
}

/// Response to `POST /resolver/order/{orderHash}/cancel`. A leg is absent
/// when its escrow was never deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSwapResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_cancellation_tx: Option<TransactionDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_cancellation_tx: Option<TransactionDto>,
}

/// Response to `GET /resolver/order/{orderHash}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_hash: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_escrow_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_escrow_address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    /// Seconds since the service started
    pub uptime: f64,
    /// Unix milliseconds
    pub timestamp: i64,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
