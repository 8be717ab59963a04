// Copyright (c) 2024 The Botho Foundation

//! Tezos escrow adapter.
//!
//! Every escrow action is a call to an entrypoint of the escrow factory (for
//! deployments) or of the escrow contract itself. Deadlines are passed as
//! absolute millisecond timestamps computed from the shared anchor.

pub mod micheline;
pub mod rpc;

use std::time::Duration;

use async_trait::async_trait;
use fusion_swap_core::{
    tezos::TezosKeypair, Chain, ChainError, DstDeployment, EscrowChainService, EscrowSide,
    Immutables, Secret, SignedCrossChainOrder, SrcDeployment, TransactionRecord, U256,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::TezosConfig;

use self::rpc::{OperationOutcome, TezosRpc};

#[derive(Debug, Clone)]
pub struct TezosSettings {
    pub escrow_factory: String,
    pub fee_mutez: u64,
    pub gas_limit: u64,
    pub storage_limit: u64,
    pub poll_interval: Duration,
}

impl From<&TezosConfig> for TezosSettings {
    fn from(config: &TezosConfig) -> Self {
        Self {
            escrow_factory: config.escrow_factory.clone(),
            fee_mutez: config.fee_mutez,
            gas_limit: config.gas_limit,
            storage_limit: config.storage_limit,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }
}

/// A confirmed operation.
struct Included {
    record: TransactionRecord,
    outcome: OperationOutcome,
}

pub struct TezosEscrowService {
    rpc: TezosRpc,
    keypair: TezosKeypair,
    settings: TezosSettings,
}

/// Build the adapter from configuration and an `edsk` or hex secret key.
pub fn connect(config: &TezosConfig, secret_key: &str) -> Result<TezosEscrowService, ChainError> {
    let keypair = TezosKeypair::from_secret_str(secret_key)?;
    Ok(TezosEscrowService::new(
        TezosRpc::new(config.rpc_url.clone()),
        keypair,
        TezosSettings::from(config),
    ))
}

/// Mutez sent along with a deployment: the safety deposit, plus the swap
/// amount when the escrowed token is tez.
fn deployment_amount(immutables: &Immutables) -> U256 {
    let native = immutables.token.is_empty() || immutables.token.eq_ignore_ascii_case("tez");
    if native {
        immutables.amount.saturating_add(immutables.safety_deposit)
    } else {
        immutables.safety_deposit
    }
}

impl TezosEscrowService {
    pub fn new(rpc: TezosRpc, keypair: TezosKeypair, settings: TezosSettings) -> Self {
        Self {
            rpc,
            keypair,
            settings,
        }
    }

    fn transaction(
        &self,
        counter: u64,
        destination: &str,
        amount: U256,
        entrypoint: &str,
        value: Value,
    ) -> Value {
        json!({
            "kind": "transaction",
            "source": self.keypair.address(),
            "fee": self.settings.fee_mutez.to_string(),
            "counter": counter.to_string(),
            "gas_limit": self.settings.gas_limit.to_string(),
            "storage_limit": self.settings.storage_limit.to_string(),
            "amount": amount.to_string(),
            "destination": destination,
            "parameters": {
                "entrypoint": entrypoint,
                "value": value
            }
        })
    }

    fn reveal(&self, counter: u64) -> Value {
        json!({
            "kind": "reveal",
            "source": self.keypair.address(),
            "fee": self.settings.fee_mutez.to_string(),
            "counter": counter.to_string(),
            "gas_limit": self.settings.gas_limit.to_string(),
            "storage_limit": "0",
            "public_key": self.keypair.public_key()
        })
    }

    /// Forge, sign and inject one entrypoint call, then wait for inclusion.
    async fn submit(
        &self,
        destination: &str,
        amount: U256,
        entrypoint: &str,
        value: Value,
    ) -> Result<Included, ChainError> {
        let source = self.keypair.address();
        let head = self.rpc.head().await?;
        let mut counter = self.rpc.counter(&source).await? + 1;

        let mut contents = Vec::with_capacity(2);
        if self.rpc.manager_key(&source).await?.is_none() {
            contents.push(self.reveal(counter));
            counter += 1;
        }
        contents.push(self.transaction(counter, destination, amount, entrypoint, value));

        let forged = self.rpc.forge(&head.hash, &contents).await?;
        let forged_bytes = hex::decode(&forged)
            .map_err(|e| ChainError::MalformedResponse(format!("forged bytes: {}", e)))?;
        let signature = self.keypair.sign_operation(&forged_bytes);

        let op_hash = self
            .rpc
            .inject(&format!("{}{}", forged, hex::encode(signature)))
            .await?;
        debug!(op = %op_hash, entrypoint, "Injected Tezos operation");

        let included = self.wait_for_inclusion(&op_hash, head.level + 1).await?;
        if !included.outcome.applied {
            return Err(ChainError::Reverted {
                tx: op_hash,
                reason: included.outcome.errors.join(", "),
            });
        }
        info!(op = %op_hash, level = %included.record.block, entrypoint, "Tezos operation applied");
        Ok(included)
    }

    /// Scan blocks from `from_level` until the operation shows up. The
    /// resolver bounds the wait.
    async fn wait_for_inclusion(
        &self,
        op_hash: &str,
        from_level: u64,
    ) -> Result<Included, ChainError> {
        let mut level = from_level;
        loop {
            let head = self.rpc.head().await?;
            while level <= head.level {
                let operations = self.rpc.manager_operations(level).await?;
                if let Some(op) = operations.iter().find(|op| op.hash == op_hash) {
                    let header = if level == head.level {
                        head.clone()
                    } else {
                        self.rpc.header(level).await?
                    };
                    return Ok(Included {
                        record: TransactionRecord {
                            hash: op_hash.to_string(),
                            block: level.to_string(),
                            timestamp: header.unix_timestamp()?,
                        },
                        outcome: op.outcome(),
                    });
                }
                level += 1;
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    fn first_origination(op_hash: &str, outcome: &OperationOutcome) -> Result<String, ChainError> {
        outcome.originated_contracts.first().cloned().ok_or_else(|| {
            ChainError::MalformedResponse(format!("operation {} originated no escrow", op_hash))
        })
    }
}

#[async_trait]
impl EscrowChainService for TezosEscrowService {
    fn chain(&self) -> Chain {
        Chain::TezosGhostnet
    }

    async fn resolver_address(&self) -> Result<String, ChainError> {
        Ok(self.keypair.address())
    }

    async fn deploy_src(
        &self,
        signed: &SignedCrossChainOrder,
    ) -> Result<SrcDeployment, ChainError> {
        // The chain head is the anchor; deadlines are fixed in the parameters
        let anchor = self.rpc.head().await?.unix_timestamp()?;
        let immutables = Immutables::for_side(
            signed,
            EscrowSide::Src,
            self.keypair.address(),
            Some(anchor),
        );

        let value = micheline::pair(vec![
            micheline::immutables(&immutables),
            micheline::string(&signed.signature),
        ]);
        let included = self
            .submit(
                &self.settings.escrow_factory,
                immutables.safety_deposit,
                "deploy_src",
                value,
            )
            .await?;
        let escrow = Self::first_origination(&included.record.hash, &included.outcome)?;

        Ok(SrcDeployment {
            tx: included.record,
            immutables,
            escrow_address: Some(escrow),
        })
    }

    async fn deploy_dst(&self, immutables: &Immutables) -> Result<DstDeployment, ChainError> {
        if immutables.deployed_at.is_none() {
            return Err(ChainError::Model(fusion_swap_core::SwapError::InvalidOrder(
                "destination immutables without deployment time".to_string(),
            )));
        }

        let included = self
            .submit(
                &self.settings.escrow_factory,
                deployment_amount(immutables),
                "deploy_dst",
                micheline::immutables(immutables),
            )
            .await?;
        let escrow = Self::first_origination(&included.record.hash, &included.outcome)?;

        Ok(DstDeployment {
            tx: included.record,
            escrow_address: escrow,
        })
    }

    async fn withdraw(
        &self,
        escrow_address: &str,
        secret: &Secret,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        let value = micheline::pair(vec![
            micheline::bytes(secret.as_bytes()),
            micheline::immutables(immutables),
        ]);
        let included = self
            .submit(escrow_address, U256::ZERO, "withdraw", value)
            .await?;
        Ok(included.record)
    }

    async fn cancel(
        &self,
        escrow_address: &str,
        _immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        // The escrow holds its own immutables; cancel takes no arguments
        let included = self
            .submit(escrow_address, U256::ZERO, "cancel", micheline::unit())
            .await?;
        Ok(included.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_swap_core::{HashLock, TimeLocks, B256};

    fn immutables(token: &str) -> Immutables {
        Immutables {
            order_hash: B256::ZERO,
            hash_lock: HashLock(B256::ZERO),
            maker: "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".to_string(),
            taker: "tz1c8PEDNfj6UxoQM2XCyfTHM5KbGGgoqDrH".to_string(),
            token: token.to_string(),
            token_id: None,
            amount: U256::from(5_000u64),
            safety_deposit: U256::from(100u64),
            time_locks: TimeLocks::default(),
            deployed_at: Some(1),
        }
    }

    #[test]
    fn test_native_deployment_carries_amount() {
        assert_eq!(deployment_amount(&immutables("tez")), U256::from(5_100u64));
        assert_eq!(deployment_amount(&immutables("")), U256::from(5_100u64));
        assert_eq!(
            deployment_amount(&immutables("KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh")),
            U256::from(100u64)
        );
    }

    #[test]
    fn test_transaction_content_layout() {
        let service = TezosEscrowService::new(
            TezosRpc::new("http://localhost:8732"),
            TezosKeypair::from_seed([1u8; 32]),
            TezosSettings {
                escrow_factory: "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh".to_string(),
                fee_mutez: 1_000,
                gas_limit: 10_000,
                storage_limit: 500,
                poll_interval: Duration::from_secs(1),
            },
        );

        let op = service.transaction(
            7,
            "KT1Hrnr3Tn5HDCS8UU5KkDBDu4D6rjXMfkwh",
            U256::from(3u8),
            "cancel",
            micheline::unit(),
        );
        assert_eq!(op["kind"], "transaction");
        assert_eq!(op["counter"], "7");
        assert_eq!(op["amount"], "3");
        assert_eq!(op["parameters"]["entrypoint"], "cancel");
        assert_eq!(op["source"], json!(service.keypair.address()));
    }
}
