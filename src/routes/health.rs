//! Landing and health endpoints
//!
//! The landing route doubles as the retention-sweep trigger: it is the
//! cheapest, most frequently hit entry point, so stale workspaces get
//! reclaimed without a timer.

use std::time::SystemTime;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::session::sweeper;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "pdfdesk-server",
    })
}

async fn index(State(state): State<AppState>) -> Json<HealthResponse> {
    let roots = state.workspaces().roots();
    let retention = state.config().storage.retention;
    let removed = sweeper::sweep(&roots, retention, SystemTime::now()).await;
    if removed > 0 {
        tracing::info!(removed, "Swept idle session workspaces");
    }

    Json(HealthResponse {
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
        service: "pdfdesk-server",
    })
}
