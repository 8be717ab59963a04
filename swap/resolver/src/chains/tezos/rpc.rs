// Copyright (c) 2024 The Botho Foundation

//! Minimal Tezos node RPC client.

use chrono::DateTime;
use fusion_swap_core::ChainError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub level: u64,
    pub timestamp: String,
}

impl BlockHeader {
    /// Block time as unix seconds.
    pub fn unix_timestamp(&self) -> Result<u64, ChainError> {
        let parsed = DateTime::parse_from_rfc3339(&self.timestamp).map_err(|e| {
            ChainError::MalformedResponse(format!("block timestamp {:?}: {}", self.timestamp, e))
        })?;
        u64::try_from(parsed.timestamp())
            .map_err(|_| ChainError::MalformedResponse("negative block timestamp".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ForgeRequest<'a> {
    branch: &'a str,
    contents: &'a [Value],
}

/// An operation included in a block, as returned by `operations/3`.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludedOperation {
    pub hash: String,
    #[serde(default)]
    pub contents: Vec<Value>,
}

/// Outcome of an included manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub applied: bool,
    pub errors: Vec<String>,
    pub originated_contracts: Vec<String>,
}

impl IncludedOperation {
    /// Fold the results of every content and its internal operations.
    pub fn outcome(&self) -> OperationOutcome {
        let mut outcome = OperationOutcome {
            applied: true,
            errors: Vec::new(),
            originated_contracts: Vec::new(),
        };

        for content in &self.contents {
            let metadata = &content["metadata"];
            let internal = metadata["internal_operation_results"]
                .as_array()
                .into_iter()
                .flatten()
                .map(|op| &op["result"]);

            for result in std::iter::once(&metadata["operation_result"]).chain(internal) {
                if result.is_null() {
                    continue;
                }
                if result["status"].as_str() != Some("applied") {
                    outcome.applied = false;
                }
                for error in result["errors"].as_array().into_iter().flatten() {
                    if let Some(id) = error["id"].as_str() {
                        outcome.errors.push(id.to_string());
                    }
                }
                for contract in result["originated_contracts"].as_array().into_iter().flatten() {
                    if let Some(address) = contract.as_str() {
                        outcome.originated_contracts.push(address.to_string());
                    }
                }
            }
        }
        outcome
    }
}

#[derive(Debug, Clone)]
pub struct TezosRpc {
    client: reqwest::Client,
    base_url: String,
}

impl TezosRpc {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(format!("GET {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ChainError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(format!("POST {}: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ChainError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChainError::Rpc(format!("{} returned {}: {}", path, status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(format!("{}: {}", path, e)))
    }

    pub async fn head(&self) -> Result<BlockHeader, ChainError> {
        self.get("/chains/main/blocks/head/header").await
    }

    pub async fn header(&self, level: u64) -> Result<BlockHeader, ChainError> {
        self.get(&format!("/chains/main/blocks/{}/header", level)).await
    }

    pub async fn counter(&self, address: &str) -> Result<u64, ChainError> {
        let counter: String = self
            .get(&format!(
                "/chains/main/blocks/head/context/contracts/{}/counter",
                address
            ))
            .await?;
        counter
            .parse()
            .map_err(|_| ChainError::MalformedResponse(format!("counter {:?}", counter)))
    }

    /// Revealed public key of an implicit account, if any.
    pub async fn manager_key(&self, address: &str) -> Result<Option<String>, ChainError> {
        self.get(&format!(
            "/chains/main/blocks/head/context/contracts/{}/manager_key",
            address
        ))
        .await
    }

    /// Forge operation contents into unsigned bytes (hex).
    pub async fn forge(&self, branch: &str, contents: &[Value]) -> Result<String, ChainError> {
        self.post(
            "/chains/main/blocks/head/helpers/forge/operations",
            &ForgeRequest { branch, contents },
        )
        .await
    }

    /// Inject signed operation bytes and return the operation hash.
    pub async fn inject(&self, signed_hex: &str) -> Result<String, ChainError> {
        self.post("/injection/operation?chain=main", signed_hex).await
    }

    /// Manager operations (validation pass 3) included at `level`.
    pub async fn manager_operations(
        &self,
        level: u64,
    ) -> Result<Vec<IncludedOperation>, ChainError> {
        self.get(&format!("/chains/main/blocks/{}/operations/3", level))
            .await
    }
}
