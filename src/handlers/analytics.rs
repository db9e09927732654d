use crate::app_state::AppState;
use crate::infrastructure::metrics::prometheus::families::*;
use crate::registry::RegistrySnapshot;
use axum::{extract::State, Json};
use serde::Serialize;

/// Human-oriented digest of the current metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_requests: u64,
    pub error_requests: u64,
    /// Percentage of requests that ended in a 5xx or were aborted.
    pub error_rate: f64,
    /// Mean request duration in seconds.
    pub avg_response_time: f64,
    pub active_connections: i64,
    pub user_registrations: u64,
    pub orders_processed: u64,
    /// Share of cache lookups that hit, in `[0, 1]`.
    pub cache_hit_ratio: f64,
}

/// Derive the summary from a registry snapshot.
///
/// Every figure is computed from the same snapshot, so each family is
/// internally consistent. An empty snapshot (metrics disabled) yields zeros.
pub fn summarize(snapshot: &RegistrySnapshot) -> AnalyticsSummary {
    // ---
    let total_requests = snapshot.sum(REQUESTS_TOTAL, &[]);
    let error_requests = snapshot.sum(REQUESTS_TOTAL, &[("status", "5xx")])
        + snapshot.sum(REQUESTS_TOTAL, &[("status", "aborted")]);

    let (duration_sum, duration_count) = snapshot.histogram_totals(REQUEST_DURATION_SECONDS);
    let (_, orders_processed) = snapshot.histogram_totals(ORDER_PROCESSING_DURATION_SECONDS);

    let hits = snapshot.sum(CACHE_HITS_TOTAL, &[]);
    let misses = snapshot.sum(CACHE_MISSES_TOTAL, &[]);

    AnalyticsSummary {
        total_requests: total_requests as u64,
        error_requests: error_requests as u64,
        error_rate: ratio(error_requests, total_requests) * 100.0,
        avg_response_time: ratio(duration_sum, duration_count as f64),
        active_connections: snapshot.sum(ACTIVE_CONNECTIONS, &[]) as i64,
        user_registrations: snapshot.sum(USER_REGISTRATIONS_TOTAL, &[]) as u64,
        orders_processed,
        cache_hit_ratio: ratio(hits, hits + misses),
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Handler for `GET /analytics/metrics`.
///
/// Unlike `/metrics`, this is meant for people: a handful of derived figures
/// rather than raw series.
#[tracing::instrument(skip(state))]
pub async fn analytics_handler(State(state): State<AppState>) -> Json<AnalyticsSummary> {
    // ---
    Json(summarize(&state.metrics().snapshot()))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{Metrics, RequestOutcome};
    use crate::infrastructure::metrics::prometheus::PrometheusMetrics;
    use crate::registry::Registry;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn empty_snapshot_is_all_zero() {
        // ---
        let summary = summarize(&RegistrySnapshot::default());
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.error_rate, 0.0);
        assert_eq!(summary.avg_response_time, 0.0);
        assert_eq!(summary.cache_hit_ratio, 0.0);
    }

    #[test]
    fn derives_figures_from_recorded_metrics() {
        // ---
        let metrics = PrometheusMetrics::new(Arc::new(Registry::new())).unwrap();

        for _ in 0..3 {
            metrics.record_http_request(
                "GET",
                "/health",
                RequestOutcome::Completed(200),
                Duration::from_millis(100),
            );
        }
        metrics.record_http_request(
            "GET",
            "/simulate/error",
            RequestOutcome::Completed(500),
            Duration::from_millis(500),
        );
        metrics.record_user_registration();
        metrics.record_order_processed(Duration::from_secs(1));
        metrics.record_order_processed(Duration::from_secs(2));
        metrics.record_cache_access("local", true);
        metrics.record_cache_access("local", true);
        metrics.record_cache_access("local", true);
        metrics.record_cache_access("redis", false);
        metrics.connection_opened();

        let summary = summarize(&metrics.snapshot());
        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.error_requests, 1);
        assert!((summary.error_rate - 25.0).abs() < 1e-9);
        assert!((summary.avg_response_time - 0.2).abs() < 1e-9);
        assert_eq!(summary.active_connections, 1);
        assert_eq!(summary.user_registrations, 1);
        assert_eq!(summary.orders_processed, 2);
        assert!((summary.cache_hit_ratio - 0.75).abs() < 1e-9);
    }
}
