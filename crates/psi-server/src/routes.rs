//! HTTP routes
//!
//! - `POST /upload` - submit a digest file (multipart field `myFile`)
//! - `GET  /round`  - current round status
//! - `GET  /health` - liveness probe
//! - `GET  /metrics` - Prometheus exposition, when enabled

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use psi_core::RoundStatus;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{Result, ServerError};
use crate::gateway;
use crate::metrics;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rounds_completed: u64,
}

/// Create the router
pub fn create_router(state: SharedState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/upload", post(upload_handler))
        .route("/round", get(round_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn upload_handler(State(state): State<SharedState>, multipart: Multipart) -> Result<Response> {
    let outcome = gateway::submit(&state, multipart).await.map_err(|e| {
        metrics::record_rejected(e.code());
        e
    })?;

    metrics::record_outcome(&outcome);
    Ok(gateway::render(outcome))
}

async fn round_handler(State(state): State<SharedState>) -> Json<RoundStatus> {
    Json(state.coordinator.status())
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rounds_completed: state.coordinator.status().rounds_completed,
    })
}

async fn metrics_handler(State(state): State<SharedState>) -> Result<String> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ServerError::MetricsDisabled)
}
