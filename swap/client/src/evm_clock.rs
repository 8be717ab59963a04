// Copyright (c) 2024 The Botho Foundation

//! Latest block timestamp of an EVM chain over JSON-RPC.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use fusion_swap_core::{BlockClock, SwapError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ClientError;

const RPC_TIMEOUT: Duration = Duration::from_secs(30);

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    /// Hex quantity, e.g. "0x6553f100"
    timestamp: String,
}

/// Reads `eth_getBlockByNumber("latest")` from an Ethereum node.
#[derive(Debug, Clone)]
pub struct EvmBlockClock {
    client: reqwest::Client,
    rpc_url: String,
}

impl EvmBlockClock {
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(RPC_TIMEOUT).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    pub async fn latest_timestamp(&self) -> Result<u64, ClientError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "eth_getBlockByNumber",
            params: json!(["latest", false]),
            id: REQUEST_ID.fetch_add(1, Ordering::SeqCst),
        };

        let response = self.client.post(&self.rpc_url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::MalformedResponse {
                endpoint: self.rpc_url.clone(),
                reason: format!("HTTP status {}", response.status()),
            });
        }

        let response: JsonRpcResponse<BlockHeader> = response.json().await?;
        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        let block = response.result.ok_or_else(|| ClientError::MalformedResponse {
            endpoint: self.rpc_url.clone(),
            reason: "no latest block".to_string(),
        })?;

        parse_quantity(&block.timestamp).ok_or_else(|| ClientError::MalformedResponse {
            endpoint: self.rpc_url.clone(),
            reason: format!("block timestamp {:?}", block.timestamp),
        })
    }
}

fn parse_quantity(value: &str) -> Option<u64> {
    let digits = value.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

#[async_trait]
impl BlockClock for EvmBlockClock {
    async fn latest_block_timestamp(&self) -> Result<u64, SwapError> {
        self.latest_timestamp()
            .await
            .map_err(|e| SwapError::Clock(e.to_string()))
    }
}
