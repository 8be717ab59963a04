// Copyright (c) 2024 The Botho Foundation

//! Swap command

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use fusion_swap_client::{AssetDescriptor, ClientConfig, EvmBlockClock, SwapManager};
use fusion_swap_core::{dto::format_b256, Chain, EvmOrderSigner, OrderSigner, SwapRequest};
use tracing::debug;
use zeroize::Zeroizing;

use super::{print_success, print_tx, print_warning};

fn load_signer(config: &ClientConfig) -> Result<EvmOrderSigner> {
    let path = config
        .ethereum
        .maker_key_file
        .as_deref()
        .ok_or_else(|| anyhow!("ethereum.maker_key_file is not set"))?;
    let key = Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read maker key from {}", path))?,
    );
    Ok(EvmOrderSigner::from_hex(key.trim())?)
}

/// Run the swap command
pub async fn run(
    config: &ClientConfig,
    src_amount: String,
    src: AssetDescriptor,
    dst_amount: String,
    dst: AssetDescriptor,
    receiver: Option<String>,
) -> Result<()> {
    if src.chain != Chain::Ethereum {
        bail!("Swaps from {} are not supported yet", src.chain);
    }

    let receiver = receiver.or_else(|| config.tezos.receiver.clone());
    if dst.chain == Chain::TezosGhostnet && receiver.is_none() {
        bail!("A Tezos receiver is required: pass --receiver or set tezos.receiver");
    }

    let signer = load_signer(config)?;
    println!("Maker: {}", signer.address());

    let clock = EvmBlockClock::new(&config.ethereum.rpc_url)?;
    let manager = SwapManager::from_config(config, Arc::new(signer), Arc::new(clock))?;

    let request = SwapRequest {
        src_chain: src.chain,
        src_token: src.token,
        src_amount,
        dst_chain: dst.chain,
        dst_token: dst.token,
        dst_amount,
        receiver,
    };
    debug!(?request, "Swap request");

    println!("Submitting order to {}...", manager.resolver().base_url());
    let receipt = manager.swap(&request).await?;
    let deployment = &receipt.deployment;

    println!();
    print_success("Escrows deployed");
    println!("  Order hash:            {}", format_b256(&receipt.order_hash));
    println!("  Source escrow:         {}", deployment.src_escrow_address);
    print_tx("Source deployment:", &deployment.src_escrow_tx);
    println!("  Destination escrow:    {}", deployment.dst_escrow_address);
    print_tx("Destination deployment:", &deployment.dst_escrow_tx);
    println!();
    println!("  Secret:                {}", receipt.secret.to_hex());
    println!();
    print_warning("Keep the secret private until you withdraw. Anyone holding it can");
    println!("         claim the destination funds once the escrows are public.");
    println!(
        "Withdraw with: fusion-swap withdraw {} <secret>",
        format_b256(&receipt.order_hash)
    );

    Ok(())
}
