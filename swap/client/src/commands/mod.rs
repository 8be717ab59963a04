// Copyright (c) 2024 The Botho Foundation

//! CLI Commands

pub mod cancel;
pub mod status;
pub mod swap;
pub mod withdraw;

use anyhow::{Context, Result};
use fusion_swap_client::{ClientConfig, ResolverClient};
use fusion_swap_core::{api::TransactionDto, dto::parse_b256, OrderHash};

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("\x1b[31mError:\x1b[0m {}", message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("\x1b[32m{}\x1b[0m", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("\x1b[33mWarning:\x1b[0m {}", message);
}

pub fn print_tx(label: &str, tx: &TransactionDto) {
    println!("  {:<22} {} (block {}, time {})", label, tx.hash, tx.block, tx.timestamp);
}

pub fn parse_order_hash(value: &str) -> Result<OrderHash> {
    Ok(parse_b256("orderHash", value)?)
}

pub fn resolver_client(config: &ClientConfig) -> Result<ResolverClient> {
    ResolverClient::new(&config.resolver_url)
        .with_context(|| format!("Failed to create resolver client for {}", config.resolver_url))
}
