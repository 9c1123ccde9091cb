//! # HTTP Server
//!
//! Prometheus metrics and Kubernetes probes.
//!
//! - `/metrics`: Prometheus text format
//! - `/healthz`: liveness, always 200 while the process serves requests
//! - `/readyz`: readiness, 200 once the server is bound

use crate::observability::metrics::gather_metrics;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared server state
#[derive(Debug, Clone, Default)]
pub struct ServerState {
    pub is_ready: Arc<AtomicBool>,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
///
/// Marks the state ready once the listener is bound.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub async fn start_server(port: u16, state: Arc<ServerState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind HTTP server to port {port}"))?;
    info!("HTTP server listening on 0.0.0.0:{}", port);

    state.is_ready.store(true, Ordering::Relaxed);
    axum::serve(listener, router(state))
        .await
        .context("HTTP server terminated")?;
    Ok(())
}

async fn metrics() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    if state.is_ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}
