//! Perishable Routing - Axum Server

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use perishable_routing::api::{create_router, AppState};
use perishable_routing::config::ServiceConfig;
use perishable_routing::console;
use perishable_routing::demo_data::reference_catalog;
use perishable_routing::error::RoutingError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Service failed");
        eprintln!("perishable-routing: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RoutingError> {
    let config = ServiceConfig::from_env()?;

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.env_filter(rust_log.as_deref())?)
        .init();

    let shutdown = CancellationToken::new();
    let state = Arc::new(AppState::new(
        reference_catalog(),
        config.simulation,
        shutdown.clone(),
    ));
    if let Some(transporters) = config.transporters.clone() {
        let count = transporters.len();
        state.catalog.replace_transporters(transporters)?;
        info!(count, "Loaded transporters from config");
    }

    let app = create_router(state);
    let addr = config.socket_addr()?;
    console::print_banner(addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| RoutingError::Config(format!("cannot bind {}: {}", addr, e)))?;

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown requested");
            }
            shutdown.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RoutingError::Config(format!("server error: {}", e)))
}
