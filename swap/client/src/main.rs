// Copyright (c) 2024 The Botho Foundation

//! Fusion swap maker CLI
//!
//! Swap tokens between Ethereum and Tezos through a resolver.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fusion_swap_client::{AssetDescriptor, ClientConfig};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

mod commands;

#[derive(Parser)]
#[command(name = "fusion-swap")]
#[command(about = "Swap tokens between Ethereum and Tezos with HTLC escrows")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "fusion-swap.toml")]
    config: PathBuf,

    /// Override the resolver URL from the configuration
    #[arg(long, global = true)]
    resolver_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swap tokens, e.g. `swap 100 eth:USDC 100 tezos:USDT`
    Swap {
        /// Amount to sell
        src_amount: String,

        /// Token to sell as <chain>:<tokenSymbol>
        src_asset: AssetDescriptor,

        /// Amount to buy
        dst_amount: String,

        /// Token to buy as <chain>:<tokenSymbol>
        dst_asset: AssetDescriptor,

        /// Destination chain account receiving the funds
        #[arg(long)]
        receiver: Option<String>,
    },

    /// Reveal the secret and complete a swap
    Withdraw {
        /// Order hash printed by `swap`
        order_hash: String,

        /// Secret printed by `swap`
        secret: String,
    },

    /// Cancel a swap once its cancellation window opens
    Cancel {
        order_hash: String,
    },

    /// Show the resolver's view of a swap
    Status {
        order_hash: String,
    },
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = if cli.config.exists() {
        let path = cli.config.to_string_lossy();
        debug!("Loading configuration from {}", path);
        ClientConfig::from_file(&path).map_err(|e| anyhow!(e))?
    } else {
        debug!("Using default configuration");
        ClientConfig::default()
    };
    if let Some(url) = &cli.resolver_url {
        config.resolver_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Swap {
            src_amount,
            src_asset,
            dst_amount,
            dst_asset,
            receiver,
        } => {
            commands::swap::run(&config, src_amount, src_asset, dst_amount, dst_asset, receiver)
                .await
        }
        Commands::Withdraw { order_hash, secret } => {
            commands::withdraw::run(&config, &order_hash, Zeroizing::new(secret)).await
        }
        Commands::Cancel { order_hash } => commands::cancel::run(&config, &order_hash).await,
        Commands::Status { order_hash } => commands::status::run(&config, &order_hash).await,
    }
}
