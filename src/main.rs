//! Pdfdesk Server
//!
//! A self-hosted PDF toolbox: upload documents into an anonymous
//! session-scoped workspace, transform them (metadata, merge, split,
//! encrypt, decrypt, text extraction), download the results. Idle
//! workspaces are reclaimed after a retention window.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdfdesk_server::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfdesk_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Pdfdesk Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", config.storage.data_dir.display());
    tracing::info!(
        "Upload limit: {} bytes, retention: {:?}",
        config.storage.max_upload_bytes,
        config.storage.retention
    );

    // Create the base roots up front so startup fails loudly on a bad DATA_DIR
    tokio::fs::create_dir_all(config.uploads_root())
        .await
        .context("failed to create uploads root")?;
    tokio::fs::create_dir_all(config.outputs_root())
        .await
        .context("failed to create outputs root")?;

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .context("invalid SERVER_HOST")?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState::new(config);
    let app = app(state).layer(TraceLayer::new_for_http()).layer(cors);

    tracing::info!("Pdfdesk Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
