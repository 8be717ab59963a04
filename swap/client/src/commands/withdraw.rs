// Copyright (c) 2024 The Botho Foundation

//! Withdraw command

use anyhow::Result;
use fusion_swap_client::ClientConfig;
use fusion_swap_core::Secret;
use zeroize::Zeroizing;

use super::{parse_order_hash, print_success, print_tx, resolver_client};

/// Run the withdraw command
pub async fn run(config: &ClientConfig, order_hash: &str, secret: Zeroizing<String>) -> Result<()> {
    let order_hash = parse_order_hash(order_hash)?;
    let secret: Secret = secret.parse()?;

    let client = resolver_client(config)?;
    let response = client.withdraw(&order_hash, &secret).await?;

    print_success("Swap completed");
    print_tx("Source withdrawal:", &response.src_withdrawal_tx);
    print_tx("Destination withdrawal:", &response.dst_withdrawal_tx);
    Ok(())
}
