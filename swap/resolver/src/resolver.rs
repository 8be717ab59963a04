// Copyright (c) 2024 The Botho Foundation

//! The swap state machine.
//!
//! Orders are processed by one logical flow at a time: a per-order
//! processing lock is taken with `try_lock`, so a second request for an order
//! that is already being worked on fails fast with
//! [`ResolverError::OrderBusy`] instead of queueing behind chain
//! confirmations. Registry updates happen only after the chain call that
//! justifies them has confirmed, so dropping a request future mid-flight
//! never leaves a half-written context behind.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use alloy::primitives::Address;
use fusion_swap_core::{
    signing::recover_evm_signer, Chain, ChainError, Clock, EscrowChainService, EscrowSide,
    Immutables, OrderHash, OrderHasher, Secret, SignedCrossChainOrder, SrcDeployment, Stage,
    TransactionRecord,
};
use tracing::{debug, error, info, warn};

use crate::{
    context::{OrderContext, OrderStatus, OrderStatusView},
    error::ResolverError,
};

/// Bound on a single chain call when no per-chain timeout is configured.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Final snapshots kept for orders that left the registry.
pub const DEFAULT_COMPLETED_CAPACITY: usize = 10_000;

/// Admission check run before any chain call is issued for a new order.
pub trait SwapGate: Send + Sync {
    /// Returns the rejection reason when the resolver should not take the
    /// order (insufficient liquidity, risk limits).
    fn can_swap(&self, order: &SignedCrossChainOrder) -> Result<(), String>;
}

/// Accepts every order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl SwapGate for AllowAll {
    fn can_swap(&self, _order: &SignedCrossChainOrder) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSwapOutcome {
    pub src_escrow_tx: TransactionRecord,
    pub src_escrow_address: String,
    pub dst_escrow_tx: TransactionRecord,
    pub dst_escrow_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeOutcome {
    pub src_withdrawal_tx: TransactionRecord,
    pub dst_withdrawal_tx: TransactionRecord,
}

/// Legs cancelled by one `cancel_swap` call. `status` is `Cancelled` once no
/// escrow of the order holds funds any more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOutcome {
    pub src_cancellation_tx: Option<TransactionRecord>,
    pub dst_cancellation_tx: Option<TransactionRecord>,
    pub status: OrderStatus,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct OrderSlot {
    processing: tokio::sync::Mutex<()>,
    context: Mutex<OrderContext>,
}

impl OrderSlot {
    fn new(context: OrderContext) -> Self {
        Self {
            processing: tokio::sync::Mutex::new(()),
            context: Mutex::new(context),
        }
    }

    fn snapshot(&self) -> OrderContext {
        lock(&self.context).clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut OrderContext) -> R) -> R {
        f(&mut lock(&self.context))
    }
}

/// Marks an order hash as being started. Released on drop.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<OrderHash>>,
    order_hash: OrderHash,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.order_hash);
    }
}

/// Final snapshots of orders in a terminal state, oldest evicted first.
///
/// Once evicted, a resubmitted order is turned away by the escrow factory,
/// whose deterministic escrow address is already taken.
struct Tombstones {
    capacity: usize,
    arrival: VecDeque<OrderHash>,
    views: HashMap<OrderHash, OrderStatusView>,
}

impl Tombstones {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            arrival: VecDeque::new(),
            views: HashMap::new(),
        }
    }

    fn insert(&mut self, view: OrderStatusView) {
        let order_hash = view.order_hash;
        if self.views.insert(order_hash, view).is_none() {
            self.arrival.push_back(order_hash);
        }
        while self.arrival.len() > self.capacity {
            if let Some(oldest) = self.arrival.pop_front() {
                self.views.remove(&oldest);
            }
        }
    }

    fn get(&self, order_hash: &OrderHash) -> Option<&OrderStatusView> {
        self.views.get(order_hash)
    }

    fn len(&self) -> usize {
        self.views.len()
    }
}

pub struct Resolver {
    services: HashMap<Chain, Arc<dyn EscrowChainService>>,
    hasher: Arc<dyn OrderHasher>,
    clock: Arc<dyn Clock>,
    gate: Arc<dyn SwapGate>,
    routes: HashSet<(Chain, Chain)>,
    timeouts: HashMap<Chain, Duration>,
    default_timeout: Duration,

    orders: Mutex<HashMap<OrderHash, Arc<OrderSlot>>>,
    in_flight: Mutex<HashSet<OrderHash>>,
    /// Withdrawn and cancelled orders, which leave the registry.
    completed: Mutex<Tombstones>,
}

impl Resolver {
    /// A resolver with no chains and no enabled routes.
    pub fn new(hasher: Arc<dyn OrderHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            services: HashMap::new(),
            hasher,
            clock,
            gate: Arc::new(AllowAll),
            routes: HashSet::new(),
            timeouts: HashMap::new(),
            default_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            orders: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            completed: Mutex::new(Tombstones::new(DEFAULT_COMPLETED_CAPACITY)),
        }
    }

    pub fn with_service(mut self, service: Arc<dyn EscrowChainService>) -> Self {
        self.services.insert(service.chain(), service);
        self
    }

    /// Accept orders from `src` to `dst`.
    pub fn with_route(mut self, src: Chain, dst: Chain) -> Self {
        self.routes.insert((src, dst));
        self
    }

    pub fn with_gate(mut self, gate: Arc<dyn SwapGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_timeout(mut self, chain: Chain, timeout: Duration) -> Self {
        self.timeouts.insert(chain, timeout);
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Keep the final status of at most `capacity` finished orders.
    pub fn with_completed_capacity(self, capacity: usize) -> Self {
        *lock(&self.completed) = Tombstones::new(capacity);
        self
    }

    pub fn supports_route(&self, src: Chain, dst: Chain) -> bool {
        self.routes.contains(&(src, dst))
    }

    /// Number of orders currently held in the registry.
    pub fn active_orders(&self) -> usize {
        lock(&self.orders).len()
    }

    /// Number of finished orders whose final status is still retained.
    pub fn completed_orders(&self) -> usize {
        lock(&self.completed).len()
    }

    /// Move an order that reached a terminal state out of the registry.
    fn retire(&self, view: OrderStatusView) {
        if !view.status.is_terminal() {
            return;
        }
        lock(&self.orders).remove(&view.order_hash);
        lock(&self.completed).insert(view);
    }

    /// Reject operations on an order that already left the registry.
    fn ensure_not_finished(
        &self,
        order_hash: OrderHash,
        to: OrderStatus,
    ) -> Result<(), ResolverError> {
        match lock(&self.completed).get(&order_hash) {
            Some(view) => Err(ResolverError::InvalidTransition {
                order_hash,
                from: view.status.clone(),
                to,
            }),
            None => Ok(()),
        }
    }

    fn timeout(&self, chain: Chain) -> Duration {
        self.timeouts
            .get(&chain)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    fn service(&self, chain: Chain) -> Result<Arc<dyn EscrowChainService>, ResolverError> {
        self.services.get(&chain).cloned().ok_or_else(|| {
            ResolverError::Validation(fusion_swap_core::SwapError::UnsupportedChain(
                chain.to_string(),
            ))
        })
    }

    fn slot(&self, order_hash: OrderHash) -> Result<Arc<OrderSlot>, ResolverError> {
        lock(&self.orders)
            .get(&order_hash)
            .cloned()
            .ok_or(ResolverError::OrderNotFound(order_hash))
    }

    /// Run one chain call under that chain's confirmation bound.
    async fn call<T>(
        &self,
        chain: Chain,
        operation: &'static str,
        fut: impl Future<Output = Result<T, ChainError>>,
    ) -> Result<T, ResolverError> {
        let after = self.timeout(chain);
        match tokio::time::timeout(after, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(ResolverError::Chain {
                chain,
                operation,
                source,
            }),
            Err(_) => Err(ResolverError::Timeout {
                chain,
                operation,
                after,
            }),
        }
    }

    /// Reserve `order_hash` for a `start_swap` call. Submitting an order that
    /// is in flight, registered or already withdrawn is rejected, so
    /// collateral is never locked twice for one order.
    fn claim(&self, order_hash: OrderHash) -> Result<InFlight<'_>, ResolverError> {
        if !lock(&self.in_flight).insert(order_hash) {
            return Err(ResolverError::DuplicateOrder(order_hash));
        }
        let guard = InFlight {
            set: &self.in_flight,
            order_hash,
        };

        if lock(&self.orders).contains_key(&order_hash)
            || lock(&self.completed).get(&order_hash).is_some()
        {
            return Err(ResolverError::DuplicateOrder(order_hash));
        }
        Ok(guard)
    }

    fn verify_signature(&self, signed: &SignedCrossChainOrder) -> Result<(), ResolverError> {
        let src = signed.order.src_chain();
        if !src.is_evm() {
            // tz addresses are key hashes; the escrow factory checks the
            // signature against the revealed key.
            debug!(
                order_hash = %signed.order_hash,
                chain = %src,
                "Signature check left to the source chain"
            );
            return Ok(());
        }

        let maker: Address = signed
            .order
            .order_info
            .maker
            .parse()
            .map_err(|e| ResolverError::InvalidSignature(format!("maker address: {}", e)))?;
        let signer = recover_evm_signer(&signed.order_hash, &signed.signature)
            .map_err(|e| ResolverError::InvalidSignature(e.to_string()))?;
        if signer != maker {
            return Err(ResolverError::InvalidSignature(format!(
                "signed by {}, maker is {}",
                signer, maker
            )));
        }
        Ok(())
    }

    /// Accept a signed order and deploy both escrows.
    ///
    /// Every check that needs no chain access runs first. Once the source
    /// escrow is confirmed the order is registered; any later failure leaves
    /// it registered as `Failed` for cancellation.
    pub async fn start_swap(
        &self,
        signed: SignedCrossChainOrder,
    ) -> Result<StartSwapOutcome, ResolverError> {
        let order_hash = signed.order_hash;
        let src = signed.order.src_chain();
        let dst = signed.order.dst_chain();

        signed.order.validate()?;
        let computed = self.hasher.order_hash(&signed.order)?;
        if computed != order_hash {
            warn!(%order_hash, %computed, "Rejecting order with mismatched hash");
            return Err(ResolverError::OrderHashMismatch {
                claimed: order_hash,
                computed,
            });
        }

        if !self.supports_route(src, dst) {
            return Err(ResolverError::UnsupportedDirection { src, dst });
        }
        let src_service = self.service(src)?;
        let dst_service = self.service(dst)?;
        self.verify_signature(&signed)?;

        let _in_flight = self.claim(order_hash)?;
        self.gate
            .can_swap(&signed)
            .map_err(ResolverError::SwapRejected)?;

        let (src_resolver, dst_resolver) = tokio::try_join!(
            self.call(src, "resolver address", src_service.resolver_address()),
            self.call(dst, "resolver address", dst_service.resolver_address()),
        )?;
        debug!(%order_hash, %src_resolver, %dst_resolver, "Resolver identities");

        info!(%order_hash, %src, %dst, "Deploying source escrow");
        let deployment = self
            .call(src, "deploy src", src_service.deploy_src(&signed))
            .await?;
        info!(%order_hash, chain = %src, tx = %deployment.tx.hash, "Source escrow deployed");

        let slot = Arc::new(OrderSlot::new(OrderContext::new(
            signed.clone(),
            deployment.immutables.clone(),
            deployment.tx.clone(),
        )));
        let _processing = slot
            .processing
            .try_lock()
            .map_err(|_| ResolverError::OrderBusy(order_hash))?;
        lock(&self.orders).insert(order_hash, slot.clone());

        let result = self
            .deploy_destination(
                &slot,
                &signed,
                deployment,
                src_service.as_ref(),
                dst_service.as_ref(),
                dst_resolver,
            )
            .await;

        if let Err(e) = &result {
            error!(%order_hash, error = %e, "Source escrow deployed but swap did not complete");
            slot.update(|ctx| ctx.fail(e.to_string()));
        }
        result
    }

    async fn deploy_destination(
        &self,
        slot: &OrderSlot,
        signed: &SignedCrossChainOrder,
        deployment: SrcDeployment,
        src_service: &dyn EscrowChainService,
        dst_service: &dyn EscrowChainService,
        dst_resolver: String,
    ) -> Result<StartSwapOutcome, ResolverError> {
        let order_hash = signed.order_hash;
        let src = src_service.chain();
        let dst = dst_service.chain();
        let src_immutables = &deployment.immutables;

        let mismatch = |reason: &str| ResolverError::EscrowMismatch {
            order_hash,
            reason: reason.to_string(),
        };
        if src_immutables.order_hash != order_hash {
            return Err(mismatch("order hash differs"));
        }
        if src_immutables.hash_lock != signed.order.hash_lock() {
            return Err(mismatch("hash-lock differs"));
        }
        if src_immutables.time_locks != signed.order.escrow_params.time_locks {
            return Err(mismatch("time-locks differ"));
        }
        let deployed_at = src_immutables
            .deployed_at
            .ok_or_else(|| mismatch("no deployment timestamp"))?;

        let src_escrow_address = match &deployment.escrow_address {
            Some(address) => address.clone(),
            None => {
                self.call(
                    src,
                    "src escrow address",
                    src_service.src_escrow_address(src_immutables),
                )
                .await?
            }
        };
        slot.update(|ctx| ctx.src_escrow_address = Some(src_escrow_address.clone()));
        debug!(%order_hash, escrow = %src_escrow_address, deployed_at, "Source escrow located");

        // Shared anchor: the destination windows open relative to the
        // source deployment, never to the destination's own inclusion time.
        let mut dst_immutables = Immutables::for_side(signed, EscrowSide::Dst, dst_resolver, None);
        dst_immutables.set_deployed_at(deployed_at)?;

        info!(%order_hash, chain = %dst, "Deploying destination escrow");
        let dst_deployment = self
            .call(dst, "deploy dst", dst_service.deploy_dst(&dst_immutables))
            .await?;
        info!(
            %order_hash,
            chain = %dst,
            tx = %dst_deployment.tx.hash,
            escrow = %dst_deployment.escrow_address,
            "Destination escrow deployed"
        );

        slot.update(|ctx| {
            ctx.dst_immutables = Some(dst_immutables);
            ctx.dst_deployment = Some(dst_deployment.tx.clone());
            ctx.dst_escrow_address = Some(dst_deployment.escrow_address.clone());
            ctx.transition(OrderStatus::DstDeployed)
        })?;

        Ok(StartSwapOutcome {
            src_escrow_tx: deployment.tx,
            src_escrow_address,
            dst_escrow_tx: dst_deployment.tx,
            dst_escrow_address: dst_deployment.escrow_address,
        })
    }

    /// Withdraw both escrows with the revealed secret, destination first.
    ///
    /// A wrong secret is rejected locally and leaves the order untouched.
    /// A leg that was already withdrawn by an earlier, partially failed call
    /// is not withdrawn again.
    pub async fn finalize_swap(
        &self,
        order_hash: OrderHash,
        secret: &Secret,
    ) -> Result<FinalizeOutcome, ResolverError> {
        self.ensure_not_finished(order_hash, OrderStatus::Withdrawn)?;
        let slot = self.slot(order_hash)?;
        let _processing = slot
            .processing
            .try_lock()
            .map_err(|_| ResolverError::OrderBusy(order_hash))?;
        let ctx = slot.snapshot();

        let deployed = match &ctx.status {
            OrderStatus::DstDeployed => true,
            OrderStatus::Failed { .. } => ctx.dst_immutables.is_some(),
            _ => false,
        };
        // A cancelled leg has returned its funds and can no longer be withdrawn
        let ready =
            deployed && ctx.dst_cancellation.is_none() && ctx.src_cancellation.is_none();
        if !ready {
            return Err(ResolverError::InvalidTransition {
                order_hash,
                from: ctx.status.clone(),
                to: OrderStatus::Withdrawn,
            });
        }

        if !ctx.src_immutables.hash_lock.verify(secret) {
            warn!(%order_hash, "Rejecting withdrawal with wrong secret");
            return Err(ResolverError::SecretMismatch(order_hash));
        }

        let result = self.withdraw_legs(&slot, &ctx, secret).await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(%order_hash, error = %e, "Withdrawal failed");
                slot.update(|ctx| ctx.fail(e.to_string()));
                return Err(e);
            }
        };

        let view = slot.update(|ctx| {
            ctx.transition(OrderStatus::Withdrawn)?;
            Ok::<_, ResolverError>(ctx.view())
        })?;
        self.retire(view);
        info!(%order_hash, "Swap completed");

        Ok(outcome)
    }

    async fn withdraw_legs(
        &self,
        slot: &OrderSlot,
        ctx: &OrderContext,
        secret: &Secret,
    ) -> Result<FinalizeOutcome, ResolverError> {
        let order_hash = ctx.order_hash();
        let src = ctx.order.order.src_chain();
        let dst = ctx.order.order.dst_chain();
        let src_service = self.service(src)?;
        let dst_service = self.service(dst)?;

        let dst_withdrawal_tx = match &ctx.dst_withdrawal {
            Some(tx) => tx.clone(),
            None => {
                let (escrow, immutables) = match (&ctx.dst_escrow_address, &ctx.dst_immutables) {
                    (Some(escrow), Some(immutables)) => (escrow, immutables),
                    _ => {
                        return Err(ResolverError::InvalidTransition {
                            order_hash,
                            from: ctx.status.clone(),
                            to: OrderStatus::Withdrawn,
                        })
                    }
                };
                let tx = self
                    .call(dst, "withdraw", dst_service.withdraw(escrow, secret, immutables))
                    .await?;
                info!(%order_hash, chain = %dst, tx = %tx.hash, "Destination escrow withdrawn");
                slot.update(|c| c.dst_withdrawal = Some(tx.clone()));
                tx
            }
        };

        let src_withdrawal_tx = match &ctx.src_withdrawal {
            Some(tx) => tx.clone(),
            None => {
                let escrow = self.src_escrow_address(slot, ctx, src_service.as_ref()).await?;
                let tx = self
                    .call(
                        src,
                        "withdraw",
                        src_service.withdraw(&escrow, secret, &ctx.src_immutables),
                    )
                    .await?;
                info!(%order_hash, chain = %src, tx = %tx.hash, "Source escrow withdrawn");
                slot.update(|c| c.src_withdrawal = Some(tx.clone()));
                tx
            }
        };

        Ok(FinalizeOutcome {
            src_withdrawal_tx,
            dst_withdrawal_tx,
        })
    }

    /// The recorded source escrow address, derived again when an earlier
    /// call failed before it was known.
    async fn src_escrow_address(
        &self,
        slot: &OrderSlot,
        ctx: &OrderContext,
        src_service: &dyn EscrowChainService,
    ) -> Result<String, ResolverError> {
        if let Some(address) = &ctx.src_escrow_address {
            return Ok(address.clone());
        }
        let address = self
            .call(
                src_service.chain(),
                "src escrow address",
                src_service.src_escrow_address(&ctx.src_immutables),
            )
            .await?;
        slot.update(|c| c.src_escrow_address = Some(address.clone()));
        Ok(address)
    }

    /// Cancel every escrow of the order whose cancellation window is open,
    /// destination first.
    ///
    /// Fails with [`ResolverError::CancellationPending`] when no window is
    /// open yet. Legs whose window opens later stay deployed; the order
    /// becomes `Cancelled` once none holds funds.
    pub async fn cancel_swap(&self, order_hash: OrderHash) -> Result<CancelOutcome, ResolverError> {
        self.ensure_not_finished(order_hash, OrderStatus::Cancelled)?;

        let slot = self.slot(order_hash)?;
        let _processing = slot
            .processing
            .try_lock()
            .map_err(|_| ResolverError::OrderBusy(order_hash))?;
        let ctx = slot.snapshot();

        if !ctx.status.can_transition_to(&OrderStatus::Cancelled) {
            return Err(ResolverError::InvalidTransition {
                order_hash,
                from: ctx.status.clone(),
                to: OrderStatus::Cancelled,
            });
        }

        let now = self.clock.now();
        // Without a deployment anchor the window is unknown; the escrow
        // contract is left to enforce it.
        let dst_opens_at = ctx.dst_leg_open().then(|| {
            ctx.dst_immutables
                .as_ref()
                .and_then(|i| i.deadline(Stage::DstCancellation))
                .unwrap_or(0)
        });
        let src_opens_at = ctx.src_leg_open().then(|| {
            ctx.src_immutables
                .deadline(Stage::SrcCancellation)
                .unwrap_or(0)
        });

        let cancel_dst = dst_opens_at.is_some_and(|at| now >= at);
        let cancel_src = src_opens_at.is_some_and(|at| now >= at);
        if !cancel_dst && !cancel_src {
            let opens_at = dst_opens_at.into_iter().chain(src_opens_at).min();
            return match opens_at {
                Some(opens_at) => {
                    debug!(%order_hash, now, opens_at, "Cancellation window not open");
                    Err(ResolverError::CancellationPending {
                        order_hash,
                        opens_at,
                    })
                }
                None => Err(ResolverError::InvalidTransition {
                    order_hash,
                    from: ctx.status.clone(),
                    to: OrderStatus::Cancelled,
                }),
            };
        }

        let result = self.cancel_legs(&slot, &ctx, cancel_dst, cancel_src).await;
        let (dst_cancellation_tx, src_cancellation_tx) = match result {
            Ok(txs) => txs,
            Err(e) => {
                error!(%order_hash, error = %e, "Cancellation failed");
                slot.update(|ctx| ctx.fail(e.to_string()));
                return Err(e);
            }
        };

        let view = slot.update(|ctx| {
            if !ctx.dst_leg_open() && !ctx.src_leg_open() {
                ctx.transition(OrderStatus::Cancelled)?;
            }
            Ok::<_, ResolverError>(ctx.view())
        })?;
        let status = view.status.clone();
        self.retire(view);
        info!(%order_hash, %status, "Cancellation processed");

        Ok(CancelOutcome {
            src_cancellation_tx,
            dst_cancellation_tx,
            status,
        })
    }

    async fn cancel_legs(
        &self,
        slot: &OrderSlot,
        ctx: &OrderContext,
        cancel_dst: bool,
        cancel_src: bool,
    ) -> Result<(Option<TransactionRecord>, Option<TransactionRecord>), ResolverError> {
        let order_hash = ctx.order_hash();
        let mut dst_tx = None;
        let mut src_tx = None;

        if cancel_dst {
            if let (Some(escrow), Some(immutables)) = (&ctx.dst_escrow_address, &ctx.dst_immutables)
            {
                let dst = ctx.order.order.dst_chain();
                let service = self.service(dst)?;
                let tx = self
                    .call(dst, "cancel", service.cancel(escrow, immutables))
                    .await?;
                info!(%order_hash, chain = %dst, tx = %tx.hash, "Destination escrow cancelled");
                slot.update(|c| c.dst_cancellation = Some(tx.clone()));
                dst_tx = Some(tx);
            }
        }

        if cancel_src {
            let src = ctx.order.order.src_chain();
            let service = self.service(src)?;
            let escrow = self.src_escrow_address(slot, ctx, service.as_ref()).await?;
            let tx = self
                .call(src, "cancel", service.cancel(&escrow, &ctx.src_immutables))
                .await?;
            info!(%order_hash, chain = %src, tx = %tx.hash, "Source escrow cancelled");
            slot.update(|c| c.src_cancellation = Some(tx.clone()));
            src_tx = Some(tx);
        }

        Ok((dst_tx, src_tx))
    }

    /// Current state of a registered or completed order.
    pub fn order_status(&self, order_hash: OrderHash) -> Result<OrderStatusView, ResolverError> {
        if let Some(slot) = lock(&self.orders).get(&order_hash) {
            return Ok(slot.snapshot().view());
        }
        lock(&self.completed)
            .get(&order_hash)
            .cloned()
            .ok_or(ResolverError::OrderNotFound(order_hash))
    }
}
