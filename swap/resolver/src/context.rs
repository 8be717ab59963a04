// Copyright (c) 2024 The Botho Foundation

//! Per-order state owned by the resolver.

use chrono::{DateTime, Utc};
use fusion_swap_core::{Immutables, OrderHash, SignedCrossChainOrder, TransactionRecord};

use crate::error::ResolverError;

/// Lifecycle of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    /// Accepted, source escrow not yet confirmed
    Received,
    SrcDeployed,
    DstDeployed,
    Withdrawn,
    /// A chain call failed. The order stays registered for recovery.
    Failed { reason: String },
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Withdrawn | OrderStatus::Cancelled)
    }

    /// Whether the state machine allows `self -> next`. There are no
    /// backward transitions; a failed order can still be completed or
    /// cancelled by an operator.
    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (Received, SrcDeployed) => true,
            (SrcDeployed, DstDeployed) => true,
            (DstDeployed, Withdrawn) => true,
            (Failed { .. }, Withdrawn) => true,
            (Received | SrcDeployed | DstDeployed | Failed { .. }, Failed { .. }) => true,
            (Received | SrcDeployed | DstDeployed | Failed { .. }, Cancelled) => true,
            _ => false,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            OrderStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Received => "received",
            OrderStatus::SrcDeployed => "src_deployed",
            OrderStatus::DstDeployed => "dst_deployed",
            OrderStatus::Withdrawn => "withdrawn",
            OrderStatus::Failed { .. } => "failed",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Everything the resolver needs to complete or cancel one order.
///
/// Created once the source escrow is confirmed. Fields are only filled in
/// after the chain call that produces them has confirmed.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub order: SignedCrossChainOrder,
    pub status: OrderStatus,

    pub src_immutables: Immutables,
    pub src_deployment: TransactionRecord,
    pub src_escrow_address: Option<String>,

    pub dst_immutables: Option<Immutables>,
    pub dst_deployment: Option<TransactionRecord>,
    pub dst_escrow_address: Option<String>,

    pub dst_withdrawal: Option<TransactionRecord>,
    pub src_withdrawal: Option<TransactionRecord>,
    pub dst_cancellation: Option<TransactionRecord>,
    pub src_cancellation: Option<TransactionRecord>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderContext {
    pub fn new(
        order: SignedCrossChainOrder,
        src_immutables: Immutables,
        src_deployment: TransactionRecord,
    ) -> Self {
        let now = Utc::now();
        Self {
            order,
            status: OrderStatus::SrcDeployed,
            src_immutables,
            src_deployment,
            src_escrow_address: None,
            dst_immutables: None,
            dst_deployment: None,
            dst_escrow_address: None,
            dst_withdrawal: None,
            src_withdrawal: None,
            dst_cancellation: None,
            src_cancellation: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn order_hash(&self) -> OrderHash {
        self.order.order_hash
    }

    pub fn transition(&mut self, next: OrderStatus) -> Result<(), ResolverError> {
        if !self.status.can_transition_to(&next) {
            return Err(ResolverError::InvalidTransition {
                order_hash: self.order_hash(),
                from: self.status.clone(),
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        let next = OrderStatus::Failed {
            reason: reason.into(),
        };
        if self.status.can_transition_to(&next) {
            self.status = next;
            self.updated_at = Utc::now();
        }
    }

    /// Whether the destination escrow is deployed and still holds funds.
    pub fn dst_leg_open(&self) -> bool {
        self.dst_escrow_address.is_some()
            && self.dst_withdrawal.is_none()
            && self.dst_cancellation.is_none()
    }

    pub fn src_leg_open(&self) -> bool {
        self.src_withdrawal.is_none() && self.src_cancellation.is_none()
    }

    pub fn view(&self) -> OrderStatusView {
        OrderStatusView {
            order_hash: self.order_hash(),
            status: self.status.clone(),
            src_escrow_address: self.src_escrow_address.clone(),
            dst_escrow_address: self.dst_escrow_address.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only snapshot of an order for status queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatusView {
    pub order_hash: OrderHash,
    pub status: OrderStatus,
    pub src_escrow_address: Option<String>,
    pub dst_escrow_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
