// Copyright (c) 2024 The Botho Foundation

//! Fusion Resolver Service
//!
//! Fills cross-chain HTLC swap orders between Ethereum and Tezos: deploys the
//! source and destination escrows, then withdraws or cancels them.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fusion_swap_core::{Address, Chain, Eip712OrderHasher, KeccakAddressMapper, SystemClock};
use fusion_swap_resolver::{
    api,
    chains::{evm, tezos},
    Resolver, ResolverConfig,
};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use zeroize::Zeroizing;

/// Fusion Resolver - fill HTLC swaps between Ethereum and Tezos
#[derive(Parser, Debug)]
#[command(name = "fusion-resolver")]
#[command(about = "Resolver service for Ethereum <-> Tezos HTLC swaps")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "resolver.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the listen address from the configuration
    #[arg(long)]
    listen: Option<String>,
}

fn read_key(path: Option<&str>, what: &str) -> Result<Zeroizing<String>> {
    let path = path.ok_or_else(|| anyhow!("no {} key file configured", what))?;
    let key = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} key from {}", what, path))?;
    Ok(Zeroizing::new(key.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Fusion resolver starting...");

    // Load configuration
    let config_path = args.config.to_string_lossy();
    let mut config = if args.config.exists() {
        info!("Loading configuration from {}", config_path);
        ResolverConfig::from_file(&config_path).map_err(|e| anyhow!(e))?
    } else {
        info!("Using default configuration");
        ResolverConfig::default()
    };
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    let mapper = Arc::new(KeccakAddressMapper);

    let eth_key = read_key(config.ethereum.private_key_file.as_deref(), "Ethereum")?;
    let ethereum = evm::connect(&config.ethereum, &eth_key, mapper.clone())?;

    let tezos_key = read_key(config.tezos.secret_key_file.as_deref(), "Tezos")?;
    let tezos = tezos::connect(&config.tezos, &tezos_key)?;

    info!("Resolver configuration:");
    info!("  ETH RPC: {}", config.ethereum.rpc_url);
    info!("  ETH resolver contract: {}", config.ethereum.resolver_contract);
    info!("  Tezos RPC: {}", config.tezos.rpc_url);
    info!("  Tezos escrow factory: {}", config.tezos.escrow_factory);

    let limit_order_protocol: Address = config
        .ethereum
        .limit_order_protocol
        .parse()
        .map_err(|e| anyhow!("Invalid ethereum.limit_order_protocol: {}", e))?;
    let hasher = Eip712OrderHasher::new(mapper).with_limit_order_protocol(limit_order_protocol);

    let mut resolver = Resolver::new(
        Arc::new(hasher),
        Arc::new(SystemClock),
    )
    .with_service(Arc::new(ethereum))
    .with_service(Arc::new(tezos))
    .with_timeout(
        Chain::Ethereum,
        Duration::from_secs(config.ethereum.confirmation_timeout_secs),
    )
    .with_timeout(
        Chain::TezosGhostnet,
        Duration::from_secs(config.tezos.confirmation_timeout_secs),
    )
    .with_completed_capacity(config.resolver.completed_order_capacity);

    for route in &config.resolver.routes {
        info!("  Route: {} -> {}", route.src, route.dst);
        resolver = resolver.with_route(route.src, route.dst);
    }

    let app = api::router(Arc::new(resolver));
    api::serve(&config.server.listen, app).await?;

    Ok(())
}
