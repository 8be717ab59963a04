// Copyright (c) 2024 The Botho Foundation

//! HTTP client for the resolver API.

use std::time::Duration;

use fusion_swap_core::{
    api::{
        CancelSwapResponse, ErrorResponse, FinalizeSwapResponse, HealthResponse,
        OrderStatusResponse, StartSwapResponse, WithdrawRequest,
    },
    dto::{format_b256, SignedCrossChainOrderDto},
    OrderHash, Secret, SignedCrossChainOrder,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

/// Escrow deployments wait for confirmations on two chains.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct ResolverClient {
    client: reqwest::Client,
    base_url: String,
}

impl ResolverClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn order_url(&self, order_hash: &OrderHash) -> String {
        format!("{}/resolver/order/{}", self.base_url, format_b256(order_hash))
    }

    /// Decode a 2xx body as `T`, anything else as an `{error}` body.
    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(ClientError::Resolver {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::decode(&url, response).await
    }

    /// Submit a signed order. Returns once both escrows are deployed.
    pub async fn place_order(
        &self,
        order: &SignedCrossChainOrder,
    ) -> Result<StartSwapResponse, ClientError> {
        let url = format!("{}/resolver/order", self.base_url);
        debug!(order_hash = %order.order_hash, "Submitting order to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&SignedCrossChainOrderDto::from(order))
            .send()
            .await?;
        Self::decode(&url, response).await
    }

    /// Reveal the secret so the resolver withdraws from both escrows.
    pub async fn withdraw(
        &self,
        order_hash: &OrderHash,
        secret: &Secret,
    ) -> Result<FinalizeSwapResponse, ClientError> {
        let url = format!("{}/withdraw", self.order_url(order_hash));
        let response = self
            .client
            .post(&url)
            .json(&WithdrawRequest {
                secret: secret.to_hex(),
            })
            .send()
            .await?;
        Self::decode(&url, response).await
    }

    pub async fn cancel(&self, order_hash: &OrderHash) -> Result<CancelSwapResponse, ClientError> {
        let url = format!("{}/cancel", self.order_url(order_hash));
        let response = self.client.post(&url).send().await?;
        Self::decode(&url, response).await
    }

    pub async fn status(&self, order_hash: &OrderHash) -> Result<OrderStatusResponse, ClientError> {
        let url = self.order_url(order_hash);
        let response = self.client.get(&url).send().await?;
        Self::decode(&url, response).await
    }
}
