// Copyright (c) 2024 The Botho Foundation

//! HTTP API of the resolver
//!
//! Endpoints:
//! - GET /health
//! - POST /resolver/order
//! - GET /resolver/order/{orderHash}
//! - POST /resolver/order/{orderHash}/withdraw
//! - POST /resolver/order/{orderHash}/cancel

use std::{sync::Arc, time::Instant};

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use fusion_swap_core::{
    api::{
        CancelSwapResponse, ErrorResponse, FinalizeSwapResponse, HealthResponse,
        OrderStatusResponse, StartSwapResponse, TransactionDto, WithdrawRequest,
    },
    dto::{format_b256, parse_b256, SignedCrossChainOrderDto},
    OrderHash, Secret, SignedCrossChainOrder, SwapError,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{context::OrderStatusView, error::ResolverError, resolver::Resolver};

/// Shared application state
#[derive(Clone)]
struct AppState {
    resolver: Arc<Resolver>,
    started: Instant,
}

/// A failed request, rendered as `{error}` with the status of its category.
#[derive(Debug)]
enum ApiError {
    /// Body could not be parsed at all
    BadRequest(String),
    Resolver(ResolverError),
}

impl From<ResolverError> for ApiError {
    fn from(e: ResolverError) -> Self {
        ApiError::Resolver(e)
    }
}

impl From<SwapError> for ApiError {
    fn from(e: SwapError) -> Self {
        ApiError::Resolver(ResolverError::Validation(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Resolver(e) => {
                let status = StatusCode::from_u16(e.category().status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    warn!(%status, "Request failed: {}", e);
                }
                (status, e.to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Build the router with all resolver endpoints.
pub fn router(resolver: Arc<Resolver>) -> Router {
    let state = AppState {
        resolver,
        started: Instant::now(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/resolver/order", post(start_swap))
        .route("/resolver/order/:order_hash", get(order_status))
        .route("/resolver/order/:order_hash/withdraw", post(finalize_swap))
        .route("/resolver/order/:order_hash/cancel", post(cancel_swap))
        .with_state(state)
}

/// Start the API server and run until ctrl-c.
pub async fn serve(addr: &str, app: Router) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app.layer(cors).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Resolver API listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down resolver API");
        })
        .await?;

    Ok(())
}

fn parse_order_hash(value: &str) -> Result<OrderHash, ApiError> {
    Ok(parse_b256("orderHash", value)?)
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK".to_string(),
        uptime: state.started.elapsed().as_secs_f64(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

async fn start_swap(
    State(state): State<AppState>,
    body: Result<Json<SignedCrossChainOrderDto>, JsonRejection>,
) -> Result<Json<StartSwapResponse>, ApiError> {
    let Json(dto) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let signed = SignedCrossChainOrder::try_from(dto)?;

    let outcome = state.resolver.start_swap(signed).await?;
    Ok(Json(StartSwapResponse {
        src_escrow_tx: TransactionDto::from(&outcome.src_escrow_tx),
        src_escrow_address: outcome.src_escrow_address,
        dst_escrow_tx: TransactionDto::from(&outcome.dst_escrow_tx),
        dst_escrow_address: outcome.dst_escrow_address,
    }))
}

async fn order_status(
    State(state): State<AppState>,
    Path(order_hash): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
    let order_hash = parse_order_hash(&order_hash)?;
    let view = state.resolver.order_status(order_hash)?;
    Ok(Json(status_response(&view)))
}

fn status_response(view: &OrderStatusView) -> OrderStatusResponse {
    OrderStatusResponse {
        order_hash: format_b256(&view.order_hash),
        status: view.status.to_string(),
        failure_reason: view.status.failure_reason().map(str::to_string),
        src_escrow_address: view.src_escrow_address.clone(),
        dst_escrow_address: view.dst_escrow_address.clone(),
        created_at: view.created_at.to_rfc3339(),
        updated_at: view.updated_at.to_rfc3339(),
    }
}

async fn finalize_swap(
    State(state): State<AppState>,
    Path(order_hash): Path<String>,
    body: Result<Json<WithdrawRequest>, JsonRejection>,
) -> Result<Json<FinalizeSwapResponse>, ApiError> {
    let order_hash = parse_order_hash(&order_hash)?;
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let secret: Secret = request.secret.parse()?;

    let outcome = state.resolver.finalize_swap(order_hash, &secret).await?;
    Ok(Json(FinalizeSwapResponse {
        src_withdrawal_tx: TransactionDto::from(&outcome.src_withdrawal_tx),
        dst_withdrawal_tx: TransactionDto::from(&outcome.dst_withdrawal_tx),
    }))
}

async fn cancel_swap(
    State(state): State<AppState>,
    Path(order_hash): Path<String>,
) -> Result<(StatusCode, Json<CancelSwapResponse>), ApiError> {
    let order_hash = parse_order_hash(&order_hash)?;

    let outcome = state.resolver.cancel_swap(order_hash).await?;
    Ok((
        StatusCode::OK,
        Json(CancelSwapResponse {
            src_cancellation_tx: outcome.src_cancellation_tx.as_ref().map(TransactionDto::from),
            dst_cancellation_tx: outcome.dst_cancellation_tx.as_ref().map(TransactionDto::from),
        }),
    ))
}
