use crate::app_state::AppState;
use crate::handlers::shared_types::ApiError;
use crate::simulation::ERROR_TYPES;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    message: String,
    operations: usize,
    delay_ms: u64,
}

/// Handler for generating synthetic load (GET /simulate/load).
///
/// Waits for a random delay inside the configured range so the request
/// duration histogram sees a spread of latencies, then emits a batch of
/// synthetic business operations and cache lookups. Always succeeds.
#[tracing::instrument(skip(state))]
pub async fn simulate_load(State(state): State<AppState>) -> Json<LoadResponse> {
    // ---
    let simulator = state.simulator();
    let delay = simulator.pause(simulator.config().load_delay).await;

    let metrics = state.metrics();
    let operations = simulator.operations();
    for op in &operations {
        let status = if op.success { "success" } else { "error" };
        metrics.record_business_operation(op.operation_type, status);
        metrics.record_cache_access(op.cache_type, op.cache_hit);
    }
    metrics.record_business_operation("load_simulation", "success");

    Json(LoadResponse {
        message: format!("Simulated {} operations", operations.len()),
        operations: operations.len(),
        delay_ms: delay.as_millis() as u64,
    })
}

/// Handler for generating a synthetic failure (GET /simulate/error).
///
/// Always responds `500 Internal Server Error` and increments the error
/// counter exactly once, under a randomly chosen error type.
#[tracing::instrument(skip(state))]
pub async fn simulate_error(State(state): State<AppState>) -> Result<(), ApiError> {
    // ---
    let error_type = state.simulator().pick(ERROR_TYPES);

    let metrics = state.metrics();
    metrics.record_error(error_type);
    metrics.record_business_operation("error_simulation", "error");

    tracing::error!(error_type, "Simulated failure");
    Err(ApiError::SimulatedFailure(error_type))
}
