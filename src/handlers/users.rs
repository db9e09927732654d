use crate::app_state::AppState;
use crate::domain::UserRegistration;
use crate::handlers::shared_types::ApiError;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    message: &'static str,
    user_id: Uuid,
    username: String,
}

/// Handler for registering a user (POST /users/register).
///
/// Nothing is stored: the handler simulates the processing time of a real
/// registration, then records the business event and a user-cache lookup.
///
/// - Malformed JSON → `400` (or `415`/`422` per the JSON extractor).
/// - Blank username or implausible email → `422 Unprocessable Entity`.
/// - On success, responds with `201 Created` and the generated user id.
#[tracing::instrument(skip(state, payload))]
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRegistration>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    // ---
    let Json(user) = payload?;
    user.validate().map_err(ApiError::Validation)?;

    let simulator = state.simulator();
    simulator.pause(simulator.config().register_delay).await;

    let metrics = state.metrics();
    metrics.record_user_registration();
    metrics.record_business_operation("user_registration", "success");
    metrics.record_cache_access("user_cache", simulator.chance(0.5));

    info!("User registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            message: "User registered successfully",
            user_id: simulator.uuid(),
            username: user.username,
        }),
    ))
}
