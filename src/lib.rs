//! Pdfdesk server library
//!
//! A session-scoped PDF workspace and transformation pipeline behind a small
//! HTTP surface. Each anonymous visitor gets an isolated pair of directories
//! (uploaded documents, generated artifacts); a fixed set of operations maps
//! stored documents to artifacts; idle workspaces are reclaimed after a
//! retention window.
//!
//! # Modules
//!
//! - `session`: identity resolution, workspace mapping, retention sweeper
//! - `storage`: filename sanitation and the per-session document store
//! - `pdf`: the transformation pipeline over the `lopdf` object model
//! - `routes`: the HTTP surface (routing glue only)

use axum::{extract::DefaultBodyLimit, middleware, Router};

pub mod config;
pub mod error;
pub mod pdf;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;

pub use config::Config;
pub use state::AppState;

/// Extra request-body headroom for multipart framing around the file cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().storage.max_upload_bytes as usize + MULTIPART_OVERHEAD;

    Router::new()
        .merge(routes::health::router())
        .merge(routes::upload::router())
        .merge(routes::documents::router())
        .merge(routes::files::router())
        .layer(middleware::from_fn(session::session_layer))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
