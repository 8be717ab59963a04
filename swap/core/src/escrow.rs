// Copyright (c) 2024 The Botho Foundation

//! Escrow capability interface implemented once per chain.

use async_trait::async_trait;

use crate::{
    chains::Chain,
    error::ChainError,
    hashlock::Secret,
    immutables::Immutables,
    order::SignedCrossChainOrder,
};

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: String,
    pub block: String,
    /// Unix seconds
    pub timestamp: u64,
}

/// Result of deploying the source escrow.
#[derive(Debug, Clone)]
pub struct SrcDeployment {
    pub tx: TransactionRecord,
    /// The immutables as committed on-chain, with `deployed_at` set.
    pub immutables: Immutables,
    /// Escrow address, when the chain reports it on the receipt. Adapters
    /// that leave this empty must implement
    /// [`EscrowChainService::src_escrow_address`].
    pub escrow_address: Option<String>,
}

/// Result of deploying the destination escrow.
#[derive(Debug, Clone)]
pub struct DstDeployment {
    pub tx: TransactionRecord,
    pub escrow_address: String,
}

/// The operations the resolver needs from one chain.
///
/// Every mutating call returns only after the transaction is confirmed.
/// Implementations must fail rather than no-op when the escrow contract
/// rejects a call (wrong secret, closed window).
#[async_trait]
pub trait EscrowChainService: Send + Sync {
    fn chain(&self) -> Chain;

    /// The resolver's identity on this chain.
    async fn resolver_address(&self) -> Result<String, ChainError>;

    /// Deploy the source escrow from the maker's signed order, posting the
    /// source safety deposit.
    async fn deploy_src(&self, order: &SignedCrossChainOrder) -> Result<SrcDeployment, ChainError>;

    /// Deploy the destination escrow, posting the destination liquidity and
    /// safety deposit.
    async fn deploy_dst(&self, immutables: &Immutables) -> Result<DstDeployment, ChainError>;

    async fn withdraw(
        &self,
        escrow_address: &str,
        secret: &Secret,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError>;

    async fn cancel(
        &self,
        escrow_address: &str,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError>;

    /// Derive the address of a deployed source escrow from its immutables.
    async fn src_escrow_address(&self, _immutables: &Immutables) -> Result<String, ChainError> {
        Err(ChainError::NotSupported(format!(
            "source escrow address derivation on {}",
            self.chain()
        )))
    }
}
