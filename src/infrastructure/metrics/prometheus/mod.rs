pub mod families;
mod prometheus_metrics;

pub use prometheus_metrics::PrometheusMetrics;

use crate::registry::Registry;
use std::sync::Arc;

/// Creates a new registry-backed Prometheus metrics implementation.
///
/// The registry is constructed here and owned by the returned instance; there
/// is no process-wide recorder. All service families are registered eagerly,
/// so a schema conflict fails startup instead of surfacing at request time.
pub fn create(series_limit: usize) -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!(series_limit, "Initializing Prometheus metrics");
    let registry = Arc::new(Registry::with_series_limit(series_limit));

    Ok(Arc::new(PrometheusMetrics::new(registry)?))
}
