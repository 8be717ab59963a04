// Copyright (c) 2024 The Botho Foundation

//! Cancel command

use anyhow::Result;
use fusion_swap_client::{ClientConfig, ClientError};

use super::{parse_order_hash, print_error, print_success, print_tx, resolver_client};

/// Run the cancel command
pub async fn run(config: &ClientConfig, order_hash: &str) -> Result<()> {
    let order_hash = parse_order_hash(order_hash)?;
    let client = resolver_client(config)?;

    let response = match client.cancel(&order_hash).await {
        Ok(response) => response,
        Err(e @ ClientError::Resolver { status: 425, .. }) => {
            print_error("Cancellation window is not open yet, try again later.");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    print_success("Swap cancelled");
    match &response.dst_cancellation_tx {
        Some(tx) => print_tx("Destination cancel:", tx),
        None => println!("  Destination escrow was never deployed"),
    }
    match &response.src_cancellation_tx {
        Some(tx) => print_tx("Source cancel:", tx),
        None => println!("  Source escrow was not cancelled"),
    }
    Ok(())
}
