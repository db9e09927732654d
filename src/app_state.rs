//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers (and to the instrumentation middleware) via the `State`
//! extractor. The `AppState` holds the metrics backend, the health reporter
//! and the simulator, each built once at startup.
//!
//! The state is designed to be cheaply cloneable (using `Arc` internally)
//! so it can be passed efficiently to each request handler without
//! expensive copying of resources.

use crate::domain::MetricsPtr;
use crate::health_reporter::HealthReporter;
use crate::simulation::Simulator;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the application.
///
/// # Design Principles
///
/// - **Dependency Inversion**: Handlers depend on the `Metrics` abstraction,
///   not on the registry-backed implementation.
/// - **No Hidden Globals**: The metrics registry is constructed explicitly and
///   reaches handlers, middleware and the formatter only through this struct.
/// - **Cheap Cloning**: Every field is an `Arc`.
///
/// # Lifecycle
///
/// 1. Created once in `build_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Metrics implementation for recording application events.
    ///
    /// Either registry-backed (production) or no-op (disabled).
    metrics: MetricsPtr,

    /// Runs the configured dependency probes for `GET /health`.
    health: Arc<HealthReporter>,

    /// Source of randomness and artificial latency for simulated work.
    simulator: Arc<Simulator>,
}

impl AppState {
    // ---

    pub fn new(metrics: MetricsPtr, health: Arc<HealthReporter>, simulator: Arc<Simulator>) -> Self {
        // ---
        AppState {
            metrics,
            health,
            simulator,
        }
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get a reference to the health reporter.
    pub(crate) fn health(&self) -> &HealthReporter {
        // ---
        &self.health
    }

    /// Get a reference to the simulator.
    pub(crate) fn simulator(&self) -> &Simulator {
        // ---
        &self.simulator
    }
}
