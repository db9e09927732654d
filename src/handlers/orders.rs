use crate::app_state::AppState;
use crate::domain::OrderRequest;
use crate::handlers::shared_types::ApiError;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    message: &'static str,
    order_id: u64,
    total_amount: f64,
    /// Simulated processing time in seconds, excluding the database query.
    processing_time: f64,
}

/// Handler for processing an order (POST /orders).
///
/// Simulates order processing followed by a database query, then records
/// the end-to-end processing time, the query time and a successful business
/// operation. Nothing is persisted.
///
/// - Malformed JSON → `400`.
/// - No items or a negative total → `422 Unprocessable Entity`.
/// - On success → `200 OK` with a generated order id.
#[tracing::instrument(skip(state, payload))]
pub async fn process_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    // ---
    let Json(order) = payload?;
    order.validate().map_err(ApiError::Validation)?;

    let started = Instant::now();
    let simulator = state.simulator();
    let config = simulator.config();

    let processing = simulator.pause(config.order_delay).await;

    let query_started = Instant::now();
    simulator.pause(config.db_query_delay).await;

    let metrics = state.metrics();
    metrics.record_db_query(query_started.elapsed());
    metrics.record_order_processed(started.elapsed());
    metrics.record_business_operation("order_processing", "success");

    let order_id = simulator.between(10_000, 99_999);
    info!(order_id, user_id = order.user_id, "Order processed");

    Ok(Json(OrderResponse {
        message: "Order processed successfully",
        order_id,
        total_amount: order.total_amount,
        processing_time: processing.as_secs_f64(),
    }))
}
