// Copyright (c) 2024 The Botho Foundation

//! Test doubles for the swap crates.
//!
//! [`MockEscrowService`] behaves like a well-behaved escrow chain: it
//! confirms every call immediately, enforces the hash-lock on withdrawal and
//! records what it was asked to do. Failures and slow confirmations can be
//! injected per operation.

mod fixtures;

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy::primitives::keccak256;
use async_trait::async_trait;
use fusion_swap_core::{
    BlockClock, Chain, ChainError, Clock, DstDeployment, EscrowChainService, EscrowSide, Immutables,
    OrderHash, Secret, SignedCrossChainOrder, SrcDeployment, SwapError, TransactionRecord,
};

pub use fixtures::*;

/// Operations of [`EscrowChainService`] that can be scripted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    ResolverAddress,
    DeploySrc,
    DeployDst,
    Withdraw,
    Cancel,
}

impl std::fmt::Display for MockOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MockOp::ResolverAddress => "resolver-address",
            MockOp::DeploySrc => "deploy-src",
            MockOp::DeployDst => "deploy-dst",
            MockOp::Withdraw => "withdraw",
            MockOp::Cancel => "cancel",
        };
        write!(f, "{}", name)
    }
}

/// A call the mock received, after it passed any scripted failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    DeploySrc { order_hash: OrderHash },
    DeployDst { immutables: Immutables },
    Withdraw { escrow: String, immutables: Immutables },
    Cancel { escrow: String, immutables: Immutables },
}

impl MockCall {
    pub fn op(&self) -> MockOp {
        match self {
            MockCall::DeploySrc { .. } => MockOp::DeploySrc,
            MockCall::DeployDst { .. } => MockOp::DeployDst,
            MockCall::Withdraw { .. } => MockOp::Withdraw,
            MockCall::Cancel { .. } => MockOp::Cancel,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<MockCall>,
    failures: HashSet<MockOp>,
    delays: HashMap<MockOp, Duration>,
    sequence: u64,
}

/// In-memory [`EscrowChainService`].
pub struct MockEscrowService {
    chain: Chain,
    resolver_address: String,
    deployed_at: u64,
    state: Mutex<MockState>,
}

impl MockEscrowService {
    pub fn new(chain: Chain, resolver_address: impl Into<String>) -> Self {
        Self {
            chain,
            resolver_address: resolver_address.into(),
            deployed_at: FIXTURE_DEPLOYED_AT,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Timestamp reported for source escrow deployments.
    pub fn with_deployed_at(mut self, deployed_at: u64) -> Self {
        self.deployed_at = deployed_at;
        self
    }

    /// Make every subsequent `op` fail with an RPC error.
    pub fn fail_on(&self, op: MockOp) {
        self.lock().failures.insert(op);
    }

    pub fn clear_failure(&self, op: MockOp) {
        self.lock().failures.remove(&op);
    }

    /// Make every subsequent `op` take `delay` before confirming.
    pub fn delay_on(&self, op: MockOp, delay: Duration) {
        self.lock().delays.insert(op, delay);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: MockOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    async fn enter(&self, op: MockOp) -> Result<u64, ChainError> {
        let delay = self.lock().delays.get(&op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state.failures.contains(&op) {
            return Err(ChainError::Rpc(format!("{} {} unavailable", self.chain, op)));
        }
        state.sequence += 1;
        Ok(state.sequence)
    }

    fn record(&self, call: MockCall) {
        self.lock().calls.push(call);
    }

    fn tx(&self, op: MockOp, sequence: u64, timestamp: u64) -> TransactionRecord {
        TransactionRecord {
            hash: format!("{}-{}-{}", self.chain, op, sequence),
            block: sequence.to_string(),
            timestamp,
        }
    }

    /// Deterministic chain-native escrow address for an order side.
    pub fn escrow_address(&self, order_hash: &OrderHash, side: EscrowSide) -> String {
        let mut preimage = order_hash.to_vec();
        preimage.extend_from_slice(side.to_string().as_bytes());
        let digest = keccak256(&preimage);

        match self.chain {
            Chain::Ethereum => format!("0x{}", hex::encode(&digest[12..])),
            Chain::TezosGhostnet => {
                let mut bytes = vec![2u8, 90, 121];
                bytes.extend_from_slice(&digest[12..]);
                bs58::encode(bytes).with_check().into_string()
            }
        }
    }
}

#[async_trait]
impl EscrowChainService for MockEscrowService {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn resolver_address(&self) -> Result<String, ChainError> {
        self.enter(MockOp::ResolverAddress).await?;
        Ok(self.resolver_address.clone())
    }

    async fn deploy_src(&self, order: &SignedCrossChainOrder) -> Result<SrcDeployment, ChainError> {
        let sequence = self.enter(MockOp::DeploySrc).await?;
        self.record(MockCall::DeploySrc {
            order_hash: order.order_hash,
        });

        let immutables = Immutables::for_side(
            order,
            EscrowSide::Src,
            self.resolver_address.clone(),
            Some(self.deployed_at),
        );
        Ok(SrcDeployment {
            tx: self.tx(MockOp::DeploySrc, sequence, self.deployed_at),
            escrow_address: Some(self.escrow_address(&order.order_hash, EscrowSide::Src)),
            immutables,
        })
    }

    async fn deploy_dst(&self, immutables: &Immutables) -> Result<DstDeployment, ChainError> {
        let sequence = self.enter(MockOp::DeployDst).await?;
        self.record(MockCall::DeployDst {
            immutables: immutables.clone(),
        });

        Ok(DstDeployment {
            tx: self.tx(MockOp::DeployDst, sequence, self.deployed_at),
            escrow_address: self.escrow_address(&immutables.order_hash, EscrowSide::Dst),
        })
    }

    async fn withdraw(
        &self,
        escrow_address: &str,
        secret: &Secret,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        let sequence = self.enter(MockOp::Withdraw).await?;
        let tx = self.tx(MockOp::Withdraw, sequence, self.deployed_at);

        if !immutables.hash_lock.verify(secret) {
            return Err(ChainError::Reverted {
                tx: tx.hash,
                reason: "InvalidSecret".to_string(),
            });
        }

        self.record(MockCall::Withdraw {
            escrow: escrow_address.to_string(),
            immutables: immutables.clone(),
        });
        Ok(tx)
    }

    async fn cancel(
        &self,
        escrow_address: &str,
        immutables: &Immutables,
    ) -> Result<TransactionRecord, ChainError> {
        let sequence = self.enter(MockOp::Cancel).await?;
        self.record(MockCall::Cancel {
            escrow: escrow_address.to_string(),
            immutables: immutables.clone(),
        });
        Ok(self.tx(MockOp::Cancel, sequence, self.deployed_at))
    }
}

/// A [`Clock`] that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(now: u64) -> Self {
        Self(AtomicU64::new(now))
    }

    pub fn set(&self, now: u64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockClock for FixedClock {
    async fn latest_block_timestamp(&self) -> Result<u64, SwapError> {
        Ok(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_withdraw_enforces_hashlock() {
        let secret = Secret::from_bytes([1u8; 32]);
        let order = fixture_order(&secret);
        let mock = MockEscrowService::new(Chain::Ethereum, EVM_RESOLVER_ADDRESS);

        let deployment = mock.deploy_src(&order).await.unwrap();
        let escrow = deployment.escrow_address.clone().unwrap();

        let wrong = Secret::from_bytes([2u8; 32]);
        assert!(mock
            .withdraw(&escrow, &wrong, &deployment.immutables)
            .await
            .is_err());
        mock.withdraw(&escrow, &secret, &deployment.immutables)
            .await
            .unwrap();
        assert_eq!(mock.count(MockOp::Withdraw), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockEscrowService::new(Chain::TezosGhostnet, TEZOS_RESOLVER_ADDRESS);
        mock.fail_on(MockOp::ResolverAddress);
        assert!(mock.resolver_address().await.is_err());
        mock.clear_failure(MockOp::ResolverAddress);
        assert_eq!(mock.resolver_address().await.unwrap(), TEZOS_RESOLVER_ADDRESS);
    }

    #[test]
    fn test_addresses_are_chain_native() {
        let hash = OrderHash::repeat_byte(3);
        let evm = MockEscrowService::new(Chain::Ethereum, EVM_RESOLVER_ADDRESS);
        let tezos = MockEscrowService::new(Chain::TezosGhostnet, TEZOS_RESOLVER_ADDRESS);

        assert!(evm.escrow_address(&hash, EscrowSide::Src).starts_with("0x"));
        assert!(tezos
            .escrow_address(&hash, EscrowSide::Dst)
            .starts_with("KT1"));
        assert_ne!(
            evm.escrow_address(&hash, EscrowSide::Src),
            evm.escrow_address(&hash, EscrowSide::Dst)
        );
    }
}
