// Copyright (c) 2024 The Botho Foundation

//! EVM escrow adapter.
//!
//! Calls go through the resolver contract, which forwards the maker's signed
//! limit order to the limit order protocol (source side) or creates the
//! destination escrow through the escrow factory. Addresses in escrow
//! immutables are 160-bit values widened to `uint256`.

use std::sync::Arc;

use alloy::{
    network::{EthereumWallet, ReceiptResponse as _, TransactionBuilder},
    primitives::{keccak256, Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::{BlockNumberOrTag, BlockTransactionsKind, TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::{SolCall, SolEvent, SolValue},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use fusion_swap_core::{
    AddressMapper, Asset, Chain, ChainError, DstDeployment, EscrowChainService, EscrowSide,
    Immutables, LimitOrder, LimitOrderParts, Secret, SignedCrossChainOrder, SrcDeployment, Stage,
    SwapError, TimeLocks, TransactionRecord,
};
use tracing::debug;

use crate::config::EthereumConfig;

mod abi {
    use super::sol;

    sol! {
        #[derive(Debug, PartialEq, Eq)]
        struct Immutables {
            bytes32 orderHash;
            bytes32 hashlock;
            uint256 maker;
            uint256 taker;
            uint256 token;
            uint256 amount;
            uint256 safetyDeposit;
            uint256 timelocks;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Order {
            uint256 salt;
            uint256 maker;
            uint256 receiver;
            uint256 makerAsset;
            uint256 takerAsset;
            uint256 makingAmount;
            uint256 takingAmount;
            uint256 makerTraits;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct DstImmutablesComplement {
            uint256 maker;
            uint256 amount;
            uint256 token;
            uint256 safetyDeposit;
            uint256 chainId;
        }

        interface IResolver {
            function deploySrc(
                Immutables immutables,
                Order order,
                bytes32 r,
                bytes32 vs,
                uint256 amount,
                uint256 takerTraits,
                bytes args
            ) external payable;

            function deployDst(Immutables dstImmutables, uint256 srcCancellationTimestamp)
                external payable;

            function withdraw(address escrow, bytes32 secret, Immutables immutables) external;

            function cancel(address escrow, Immutables immutables) external;
        }

        interface IEscrowFactory {
            event SrcEscrowCreated(
                Immutables srcImmutables,
                DstImmutablesComplement dstImmutablesComplement
            );

            event DstEscrowCreated(address escrow, bytes32 hashlock, uint256 taker);

            function ESCROW_SRC_IMPLEMENTATION() external view returns (address);
        }
    }
}

// Limit order taker traits
const MAKER_AMOUNT_FLAG: usize = 255;
const ARGS_EXTENSION_LENGTH_OFFSET: usize = 224;

const PROXY_PREFIX: [u8; 20] = [
    0x3d, 0x60, 0x2d, 0x80, 0x60, 0x0a, 0x3d, 0x39, 0x81, 0xf3, 0x36, 0x3d, 0x3d, 0x37, 0x3d,
    0x3d, 0x3d, 0x36, 0x3d, 0x73,
];
const PROXY_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

fn word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

fn address_from_word(value: U256) -> Address {
    Address::from_word(B256::from(value))
}

/// The protocol's `Address` type is a `uint256`, so the signed order is
/// passed with its addresses widened.
impl From<&LimitOrder> for abi::Order {
    fn from(order: &LimitOrder) -> Self {
        Self {
            salt: order.salt,
            maker: word(order.maker),
            receiver: word(order.receiver),
            makerAsset: word(order.makerAsset),
            takerAsset: word(order.takerAsset),
            makingAmount: order.makingAmount,
            takingAmount: order.takingAmount,
            makerTraits: order.makerTraits,
        }
    }
}

/// `keccak256` of the minimal proxy creation code delegating to
/// `implementation`.
pub fn proxy_bytecode_hash(implementation: Address) -> B256 {
    let mut code = Vec::with_capacity(55);
    code.extend_from_slice(&PROXY_PREFIX);
    code.extend_from_slice(implementation.as_slice());
    code.extend_from_slice(&PROXY_SUFFIX);
    keccak256(code)
}

/// Deterministic escrow address: `create2(factory, keccak256(abi.encode(
/// immutables)), proxy_bytecode_hash(implementation))`.
pub fn escrow_address(
    factory: Address,
    immutables: &abi::Immutables,
    implementation: Address,
) -> Address {
    let salt = keccak256(immutables.abi_encode());
    factory.create2(salt, proxy_bytecode_hash(implementation))
}

/// Split a 65-byte `r || s || v` signature into the compact `(r, vs)` form.
pub fn compact_signature(signature: &str) -> Result<(B256, B256), ChainError> {
    let stripped = signature.strip_prefix("0x").unwrap_or(signature);
    let bytes = hex::decode(stripped).map_err(|e| {
        ChainError::Model(SwapError::InvalidHex {
            field: "signature",
            reason: e.to_string(),
        })
    })?;
    if bytes.len() != 65 {
        return Err(ChainError::Model(SwapError::InvalidHex {
            field: "signature",
            reason: format!("expected 65 bytes, got {}", bytes.len()),
        }));
    }

    let r = B256::from_slice(&bytes[..32]);
    let mut vs = U256::from_be_slice(&bytes[32..64]);
    let v = bytes[64];
    let parity = if v >= 27 { v - 27 } else { v };
    if parity == 1 {
        vs |= U256::from(1u8) << 255usize;
    }
    Ok((r, B256::from(vs)))
}

/// Settings of the EVM adapter that do not come from the provider.
#[derive(Debug, Clone)]
pub struct EvmSettings {
    pub resolver_contract: Address,
    pub escrow_factory: Address,
    pub sender: Address,
    pub confirmations: u64,
    pub gas_limit: u64,
}

pub struct EvmEscrowService<P> {
    provider: P,
    settings: EvmSettings,
    mapper: Arc<dyn AddressMapper>,
}

/// Connect to the configured RPC endpoint with a local signing key.
pub fn connect(
    config: &EthereumConfig,
    private_key: &str,
    mapper: Arc<dyn AddressMapper>,
) -> Result<EvmEscrowService<impl Provider<Http<Client>> + Clone>, ChainError> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .map_err(|_| ChainError::Model(SwapError::InvalidKey("invalid Ethereum key".to_string())))?;
    let sender = signer.address();

    let url = config
        .rpc_url
        .parse()
        .map_err(|e| ChainError::Rpc(format!("invalid RPC url {}: {}", config.rpc_url, e)))?;
    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(EthereumWallet::from(signer))
        .on_http(url);

    let settings = EvmSettings {
        resolver_contract: parse_address(&config.resolver_contract)?,
        escrow_factory: parse_address(&config.escrow_factory)?,
        sender,
        confirmations: config.confirmations,
        gas_limit: config.gas_limit,
    };
    Ok(EvmEscrowService::new(provider, settings, mapper))
}

fn parse_address(value: &str) -> Result<Address, ChainError> {
    value.parse().map_err(|e| {
        ChainError::Model(SwapError::InvalidAddress {
            chain: Chain::Ethereum,
            address: value.to_string(),
            reason: format!("{}", e),
        })
    })
}

impl<P> EvmEscrowService<P>
where
    P: Provider<Http<Client>>,
{
    pub fn new(provider: P, settings: EvmSettings, mapper: Arc<dyn AddressMapper>) -> Self {
        Self {
            provider,
            settings,
            mapper,
        }
    }

    fn to_abi(&self, immutables: &Immutables) -> Result<abi::Immutables, ChainError> {
        let asset = Asset {
            address: immutables.token.clone(),
            token_id: immutables.token_id,
        };
        Ok(abi::Immutables {
            orderHash: immutables.order_hash,
            hashlock: immutables.hash_lock.as_b256(),
            maker: word(self.mapper.map_address(&immutables.maker)?),
            taker: word(self.mapper.map_address(&immutables.taker)?),
            token: word(self.mapper.map_asset(&asset)?),
            amount: immutables.amount,
            safetyDeposit: immutables.safety_deposit,
            // The escrow stamps the real deployment time over a zero anchor
            timelocks: immutables
                .time_locks
                .pack(immutables.deployed_at.unwrap_or_default()),
        })
    }

    fn from_abi(value: &abi::Immutables) -> Immutables {
        let (time_locks, deployed_at) = TimeLocks::unpack(value.timelocks);
        Immutables {
            order_hash: value.orderHash,
            hash_lock: value.hashlock.into(),
            maker: address_from_word(value.maker).to_checksum(None),
            taker: address_from_word(value.taker).to_checksum(None),
            token: address_from_word(value.token).to_checksum(None),
            token_id: None,
            amount: value.amount,
            safety_deposit: value.safetyDeposit,
            time_locks,
            deployed_at: Some(deployed_at),
        }
    }

    async fn send(&self, data: Vec<u8>, value: U256) -> Result<TransactionReceipt, ChainError> {
        let tx = TransactionRequest::default()
            .with_from(self.settings.sender)
            .with_to(self.settings.resolver_contract)
            .with_input(Bytes::from(data))
            .with_value(value)
            .with_gas_limit(self.settings.gas_limit);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let tx_hash = *pending.tx_hash();
        debug!(tx = %tx_hash, "Submitted Ethereum transaction");

        let receipt = pending
            .with_required_confirmations(self.settings.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        if !receipt.status() {
            return Err(ChainError::Reverted {
                tx: tx_hash.to_string(),
                reason: "execution reverted".to_string(),
            });
        }
        Ok(receipt)
    }

    async fn record(&self, receipt: &TransactionReceipt) -> Result<TransactionRecord, ChainError> {
        let number = receipt.block_number.ok_or_else(|| {
            ChainError::MalformedResponse("receipt without block number".to_string())
        })?;
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number), BlockTransactionsKind::Hashes)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or_else(|| ChainError::MalformedResponse(format!("block {} not found", number)))?;

        Ok(TransactionRecord {
            hash: receipt.transaction_hash.to_string(),
            block: number.to_string(),
            timestamp: block.header.timestamp,
        })
    }

    async fn src_implementation(&self) -> Result<Address, ChainError> {
        let call = abi::IEscrowFactory::ESCROW_SRC_IMPLEMENTATIONCall {};
        let tx = TransactionRequest::default()
            .with_to(self.settings.escrow_factory)
            .with_input(Bytes::from(call.abi_encode()));
        let output = self
            .provider
            .call(&tx)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        let decoded =
            abi::IEscrowFactory::ESCROW_SRC_IMPLEMENTATIONCall::abi_decode_returns(&output, true)
                .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;
        Ok(decoded._0)
    }

    fn decode_event<E: SolEvent>(&self, receipt: &TransactionReceipt) -> Result<E, ChainError> {
        receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.settings.escrow_factory)
            .find_map(|log| log.log_decode::<E>().ok())
            .map(|log| log.inner.data)
            .ok_or_else(|| {
                ChainError::MalformedResponse(format!(
                    "{} not found in receipt {}",
                    E::SIGNATURE,
                    receipt.transaction_hash
                ))
            })
    }
}

#[async_trait]
impl<P> EscrowChainService for EvmEscrowService<P>
where
    P: Provider<Http<Client>> + Send + Sync + 'static,
{
    fn chain(&self) -> Chain {
        Chain::Ethereum
    }

    async fn resolver_address(&self) -> Result<String, ChainError> {
        Ok(self.settings.resolver_contract.to_checksum(None))
    }

    async fn deploy_src(
        &self,
        signed: &SignedCrossChainOrder,
    ) -> Result<SrcDeployment, ChainError> {
        let order = &signed.order;
        let factory = self.mapper.map_address(&order.escrow_factory)?;
        if factory != self.settings.escrow_factory {
            return Err(ChainError::Model(SwapError::InvalidOrder(format!(
                "order is bound to escrow factory {}, resolver uses {}",
                factory, self.settings.escrow_factory
            ))));
        }

        let taker = self.settings.resolver_contract.to_checksum(None);
        let immutables = Immutables::for_side(signed, EscrowSide::Src, taker, None);

        let parts = LimitOrderParts::build(order, self.mapper.as_ref())?;
        let (r, vs) = compact_signature(&signed.signature)?;
        let taker_traits = (U256::from(1u8) << MAKER_AMOUNT_FLAG)
            | (U256::from(parts.extension.len()) << ARGS_EXTENSION_LENGTH_OFFSET)
            | order.order_info.taking_amount;

        let call = abi::IResolver::deploySrcCall {
            immutables: self.to_abi(&immutables)?,
            order: abi::Order::from(&parts.order),
            r,
            vs,
            amount: order.order_info.making_amount,
            takerTraits: taker_traits,
            args: parts.extension,
        };

        let receipt = self
            .send(call.abi_encode(), order.escrow_params.src_safety_deposit)
            .await?;
        let tx = self.record(&receipt).await?;

        let event: abi::IEscrowFactory::SrcEscrowCreated = self.decode_event(&receipt)?;
        let escrow = escrow_address(
            self.settings.escrow_factory,
            &event.srcImmutables,
            self.src_implementation().await?,
        );

        let mut immutables = Self::from_abi(&event.srcImmutables);
        // Keep chain-native spellings where the event only has the mapped form
        immutables.maker = order.order_info.maker.clone();
        immutables.token = order.order_info.maker_asset.address.clone();

        Ok(SrcDeployment {
            tx,
            immutables,
            escrow_address: Some(escrow.to_checksum(None)),
        })
    }

    async fn deploy_dst(&self, immutables: &Immutables) -> Result<DstDeployment, ChainError> {
        let src_cancellation = immutables.deadline(Stage::SrcCancellation).ok_or_else(|| {
            ChainError::Model(SwapError::InvalidOrder(
                "destination immutables without deployment time".to_string(),
            ))
        })?;

        let call = abi::IResolver::deployDstCall {
            dstImmutables: self.to_abi(immutables)?,
            srcCancellationTimestamp: U256::from(src_cancellation),
        };
        let receipt = self.send(call.abi_encode(), immutables.safety_deposit).await?;
        let tx = self.record(&receipt).await?;

        let event: abi::IEscrowFactory::DstEscrowCreated = self.decode_event(&receipt)?;
        Ok(DstDeployment {
            tx,
            escrow_address: event.escrow.to_checksum(None),
        })
    }

    async fn withdraw(
        &self,
        escrow_address: &str,
        secret: &Secret,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        let call = abi::IResolver::withdrawCall {
            escrow: parse_address(escrow_address)?,
            secret: secret.to_b256(),
            immutables: self.to_abi(immutables)?,
        };
        let receipt = self.send(call.abi_encode(), U256::ZERO).await?;
        self.record(&receipt).await
    }

    async fn cancel(
        &self,
        escrow_address: &str,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        let call = abi::IResolver::cancelCall {
            escrow: parse_address(escrow_address)?,
            immutables: self.to_abi(immutables)?,
        };
        let receipt = self.send(call.abi_encode(), U256::ZERO).await?;
        self.record(&receipt).await
    }

    async fn src_escrow_address(&self, immutables: &Immutables) -> Result<String, ChainError> {
        if immutables.deployed_at.is_none() {
            return Err(ChainError::Model(SwapError::InvalidOrder(
                "source immutables without deployment time".to_string(),
            )));
        }
        let escrow = escrow_address(
            self.settings.escrow_factory,
            &self.to_abi(immutables)?,
            self.src_implementation().await?,
        );
        Ok(escrow.to_checksum(None))
    }
}
