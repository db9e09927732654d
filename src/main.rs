use anyhow::Result;
use axum_observability::{build_router, create_tcp_probes, spawn_runtime_collector, AppConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout, honoring RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Starting axum server...");

    let config = AppConfig::from_env()?;
    let probes = create_tcp_probes(&config.health);
    let service = build_router(&config, probes)?;

    // Process gauges are refreshed in the background for the life of the server
    let collector = spawn_runtime_collector(
        service.metrics.clone(),
        service.simulator.clone(),
        config.metrics.collector_interval,
    );

    let endpoint = &config.server.bind_addr;
    info!("Starting at endpoint:{}", endpoint);
    info!(
        "Starting Axum Observability API server v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let listener = tokio::net::TcpListener::bind(endpoint).await?;
    axum::serve(listener, service.router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    collector.abort();
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}
