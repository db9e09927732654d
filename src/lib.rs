// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

use handlers::*;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// Public exports (visible outside this module)
pub mod domain;
pub mod registry;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod health_reporter;
mod infrastructure;
mod middleware;
mod runtime_collector;
mod simulation;

pub use config::*;

// Hoist up only the public symbol(s)
pub use handlers::{summarize, AnalyticsSummary};
pub use health_reporter::HealthReporter;
pub use middleware::{ROUTES, UNMATCHED_ROUTE};
pub use runtime_collector::{spawn_runtime_collector, SystemSampler};
pub use simulation::Simulator;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_prom_metrics,
    create_tcp_probes,
    TcpProbe,
};

/// Build the HTTP router from environment configuration.
///
/// Health probes are the TCP dependencies declared in `AXUM_HEALTH_REQUIRED`
/// and `AXUM_HEALTH_OPTIONAL`.
pub fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;
    let probes = create_tcp_probes(&config.health);

    Ok(build_router(&config, probes)?.router)
}

/// The router together with the shared components it was built from.
///
/// `metrics` and `simulator` are the same instances the handlers use, so the
/// runtime collector and tests observe and draw from exactly what requests do.
pub struct Service {
    pub router: Router,
    pub metrics: domain::MetricsPtr,
    pub simulator: Arc<Simulator>,
}

/// Build the HTTP router from explicit configuration and probes.
pub fn build_router(config: &AppConfig, probes: Vec<domain::ProbePtr>) -> Result<Service> {
    // ---
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Determine metrics implementation from configuration
    let metrics = match config.metrics.backend {
        MetricsBackend::Registry => create_prom_metrics(config.metrics.max_series_per_family)?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    let health = Arc::new(HealthReporter::new(probes, config.health.probe_timeout));
    let simulator = Arc::new(Simulator::new(config.simulation.clone()));

    // Build application state with all dependencies
    let app_state = AppState::new(metrics.clone(), health, simulator.clone());

    // Every route template registered here must also appear in `ROUTES`,
    // otherwise its requests are labeled `unmatched`.
    let router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/users/register", post(register_user))
        .route("/orders", post(process_order))
        .nest(
            "/simulate",
            Router::new()
                .route("/load", get(simulate_load))
                .route("/error", get(simulate_error)),
        )
        .route("/analytics/metrics", get(analytics_handler))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::track_requests,
        ))
        .with_state(app_state);

    Ok(Service {
        router,
        metrics,
        simulator,
    })
}
