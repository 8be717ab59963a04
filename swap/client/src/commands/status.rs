// Copyright (c) 2024 The Botho Foundation

//! Status command

use anyhow::Result;
use fusion_swap_client::ClientConfig;

use super::{parse_order_hash, resolver_client};

/// Run the status command
pub async fn run(config: &ClientConfig, order_hash: &str) -> Result<()> {
    let order_hash = parse_order_hash(order_hash)?;
    let status = resolver_client(config)?.status(&order_hash).await?;

    println!("Order {}", status.order_hash);
    println!("  Status:              {}", status.status);
    if let Some(reason) = &status.failure_reason {
        println!("  Failure:             {}", reason);
    }
    if let Some(address) = &status.src_escrow_address {
        println!("  Source escrow:       {}", address);
    }
    if let Some(address) = &status.dst_escrow_address {
        println!("  Destination escrow:  {}", address);
    }
    println!("  Created:             {}", status.created_at);
    println!("  Updated:             {}", status.updated_at);
    Ok(())
}
