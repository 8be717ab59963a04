// Copyright (c) 2024 The Botho Foundation

//! Maker-side swap workflow: build, sign and submit orders, then reveal the
//! secret once both escrows are in place.

use std::{str::FromStr, sync::Arc};

use fusion_swap_core::{
    api::{CancelSwapResponse, FinalizeSwapResponse, OrderStatusResponse, StartSwapResponse},
    BlockClock, Chain, Eip712OrderHasher, KeccakAddressMapper, OrderBuilder, OrderHash,
    OrderSigner, Secret, SwapRequest,
};
use tracing::info;

use crate::{config::ClientConfig, error::ClientError, resolver_client::ResolverClient};

/// A `<chain>:<token>` pair as typed on the command line, e.g. `eth:USDC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub chain: Chain,
    pub token: String,
}

impl FromStr for AssetDescriptor {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The chain part may itself contain a colon ("tezos:ghostnet")
        let (chain, token) = s.rsplit_once(':').ok_or_else(|| {
            ClientError::InvalidAsset(format!(
                "{:?} must be in the format <chain>:<tokenSymbol>",
                s
            ))
        })?;
        if chain.is_empty() || token.is_empty() {
            return Err(ClientError::InvalidAsset(format!(
                "{:?} must be in the format <chain>:<tokenSymbol>",
                s
            )));
        }
        Ok(Self {
            chain: chain.parse()?,
            token: token.to_string(),
        })
    }
}

/// Result of a submitted swap. The secret must be kept until withdrawal.
#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub order_hash: OrderHash,
    pub secret: Secret,
    pub deployment: StartSwapResponse,
}

pub struct SwapManager {
    builder: OrderBuilder,
    resolver: ResolverClient,
}

impl SwapManager {
    pub fn new(builder: OrderBuilder, resolver: ResolverClient) -> Self {
        Self { builder, resolver }
    }

    /// Wire the order builder and resolver client from configuration.
    pub fn from_config(
        config: &ClientConfig,
        signer: Arc<dyn OrderSigner>,
        clock: Arc<dyn BlockClock>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let mapper = Arc::new(KeccakAddressMapper);
        let builder = OrderBuilder::new(
            config.tokens.registry(),
            Arc::new(
                Eip712OrderHasher::new(mapper.clone())
                    .with_limit_order_protocol(config.ethereum.limit_order_protocol()?),
            ),
            mapper,
            clock,
            signer,
        )
        .with_escrow_factory(Chain::Ethereum, config.ethereum.escrow_factory.clone())
        .with_resolver(Chain::TezosGhostnet, config.tezos.resolver_address.clone())
        .with_policy(config.policy.to_policy()?);

        Ok(Self::new(builder, ResolverClient::new(&config.resolver_url)?))
    }

    pub fn resolver(&self) -> &ResolverClient {
        &self.resolver
    }

    /// Build, sign and submit an order. Returns after both escrows are
    /// deployed.
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapReceipt, ClientError> {
        let prepared = self.builder.build_order(request).await?;
        let signed = self.builder.sign(&prepared)?;
        info!(
            order_hash = %prepared.order_hash,
            src = %request.src_chain,
            dst = %request.dst_chain,
            "Order signed, submitting to resolver"
        );

        let deployment = self.resolver.place_order(&signed).await?;
        info!(
            order_hash = %prepared.order_hash,
            src_escrow = %deployment.src_escrow_address,
            dst_escrow = %deployment.dst_escrow_address,
            "Escrows deployed"
        );

        Ok(SwapReceipt {
            order_hash: prepared.order_hash,
            secret: prepared.secret,
            deployment,
        })
    }

    pub async fn withdraw(
        &self,
        order_hash: &OrderHash,
        secret: &Secret,
    ) -> Result<FinalizeSwapResponse, ClientError> {
        info!(order_hash = %order_hash, "Revealing secret to resolver");
        self.resolver.withdraw(order_hash, secret).await
    }

    pub async fn cancel(&self, order_hash: &OrderHash) -> Result<CancelSwapResponse, ClientError> {
        self.resolver.cancel(order_hash).await
    }

    pub async fn status(&self, order_hash: &OrderHash) -> Result<OrderStatusResponse, ClientError> {
        self.resolver.status(order_hash).await
    }
}
