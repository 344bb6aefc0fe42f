//! adorn-builder - Ring configurator service entry point
//!
//! Serves the "design your own ring" flow: filtered product lists for the
//! Setting and Diamond steps, the selection flow state machine, and an SSE
//! event stream for the UI.

use std::net::SocketAddr;

use adorn_builder::{build_router, AppState};
use adorn_catalog::CatalogClient;
use adorn_common::config::{resolve_api_base_url, resolve_page_size, TomlConfig};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default HTTP port for the builder service
const DEFAULT_PORT: u16 = 5810;

/// Command-line arguments for adorn-builder
#[derive(Parser, Debug)]
#[command(name = "adorn-builder")]
#[command(about = "Ring configurator service for the ADORN storefront")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ADORN_BUILDER_PORT")]
    port: Option<u16>,

    /// Base URL of the storefront REST backend
    #[arg(short, long)]
    api_base_url: Option<String>,

    /// Page size for backend list requests
    #[arg(long)]
    page_size: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config file is consulted before tracing init so its log_level can
    // seed the default filter; RUST_LOG still wins
    let config = TomlConfig::load_default();
    let default_filter = config
        .log_level
        .clone()
        .unwrap_or_else(|| "info,adorn_builder=debug".to_string());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ADORN Ring Builder (adorn-builder) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let api_base_url = resolve_api_base_url(args.api_base_url.as_deref(), &config);
    let page_size = resolve_page_size(args.page_size, &config);
    let port = args.port.or(config.port).unwrap_or(DEFAULT_PORT);

    info!("Backend: {} (page size {})", api_base_url, page_size);

    let client =
        CatalogClient::new(api_base_url.as_str()).context("Failed to create catalog client")?;
    let state = AppState::new(client, page_size);

    // Initial catalog load; the service starts serving immediately and
    // fills the snapshots as fetches complete
    tokio::spawn(adorn_builder::refresh::refresh_all(state.clone()));

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
