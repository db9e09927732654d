use crate::app_state::AppState;
use crate::domain::{HealthStatus, OverallStatus};
use axum::{extract::State, http::StatusCode, Json};

/// Responds with the health status of the server and its dependencies.
///
/// Every configured dependency probe runs concurrently, each bounded by the
/// probe timeout. A failing or slow probe marks only its own component as
/// `down`; the endpoint itself always answers.
///
/// # Responses
/// - `200 OK` with `"status": "up"` when every probe passes.
/// - `200 OK` with `"status": "degraded"` when only optional dependencies are down.
/// - `503 SERVICE UNAVAILABLE` with `"status": "down"` when a required dependency is down.
///
/// # Examples
/// - `GET /health` → `{"status":"up","components":{"database":"up"},...}`
#[tracing::instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    // ---
    let status = state.health().check().await;

    let code = match status.overall {
        OverallStatus::Up | OverallStatus::Degraded => StatusCode::OK,
        OverallStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(status))
}
