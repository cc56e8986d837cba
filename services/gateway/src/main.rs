mod config;
mod error;
mod handlers;
mod router;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use config::Config;
use feed_sync::providers::{build_client, HttpMappingProvider, HttpStateProvider};
use feed_sync::scheduler::{Scheduler, SchedulerConfig};
use feed_sync::store::SnapshotStore;
use router::create_router;
use state::AppState;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting event state service");

    let config = Config::from_env()?;
    tracing::info!(
        mappings_url = %config.mappings_url,
        state_url = %config.state_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Configuration loaded"
    );

    // Upstream feeds share one client
    let client = build_client(config.http_timeout)?;
    let store = SnapshotStore::new();
    let scheduler = Scheduler::new(
        Arc::new(HttpMappingProvider::new(client.clone(), config.mappings_url.clone())),
        Arc::new(HttpStateProvider::new(client, config.state_url.clone())),
        store.clone(),
        SchedulerConfig {
            interval: config.poll_interval,
        },
    );

    // Warm the snapshot before serving; a failure here is not fatal
    if let Err(err) = scheduler.poll_once().await {
        tracing::warn!(error = %err, "Initial poll failed, serving empty state");
    }
    scheduler.start();

    let app = create_router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
