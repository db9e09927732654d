//! Registry-backed metrics implementation.
//!
//! This module provides the concrete implementation of the `Metrics` trait
//! used in production. It owns a handle to an explicitly constructed
//! [`Registry`] and translates each business event into a counter, gauge or
//! histogram update, rendering in Prometheus text format on demand.
//!
//! Recording never fails from the caller's point of view: a registry error
//! (which can only mean a bug in this file) is logged and dropped so that
//! instrumentation can never break the request it is observing.

use super::families::*;
use crate::domain::{Metrics, RequestOutcome, SystemUsage};
use crate::registry::{exposition, Registry, RegistryError, RegistrySnapshot};
use std::sync::Arc;
use std::time::Duration;

/// Prometheus-format metrics backed by an in-process [`Registry`].
pub struct PrometheusMetrics {
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register every service family on `registry` and wrap it.
    pub fn new(registry: Arc<Registry>) -> Result<Self, RegistryError> {
        // ---
        register_all(&registry)?;
        tracing::info!("Creating Prometheus metrics");
        Ok(PrometheusMetrics { registry })
    }
}

/// Log and drop a registry error.
fn swallow(result: Result<(), RegistryError>, event: &'static str) {
    if let Err(err) = result {
        tracing::warn!(event, error = %err, "Failed to record metric");
    }
}

impl Metrics for PrometheusMetrics {
    // ---
    fn render(&self) -> String {
        exposition::render(&self.registry.snapshot())
    }

    fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    fn record_http_request(&self, method: &str, route: &str, outcome: RequestOutcome, elapsed: Duration) {
        // ---
        tracing::debug!(method, route, status = outcome.status_class(), "Recording HTTP request");

        swallow(
            self.registry.increment(
                REQUESTS_TOTAL,
                &[
                    ("method", method),
                    ("route", route),
                    ("status", outcome.status_class()),
                ],
                1.0,
            ),
            "http_request",
        );
        swallow(
            self.registry.observe(
                REQUEST_DURATION_SECONDS,
                &[("method", method), ("route", route)],
                elapsed.as_secs_f64(),
            ),
            "http_request_duration",
        );
    }

    fn connection_opened(&self) {
        swallow(self.registry.adjust(ACTIVE_CONNECTIONS, &[], 1.0), "connection_opened");
    }

    fn connection_closed(&self) {
        swallow(self.registry.adjust(ACTIVE_CONNECTIONS, &[], -1.0), "connection_closed");
    }

    fn record_user_registration(&self) {
        tracing::debug!("Recording user registration event");
        swallow(
            self.registry.increment(USER_REGISTRATIONS_TOTAL, &[], 1.0),
            "user_registration",
        );
    }

    fn record_order_processed(&self, elapsed: Duration) {
        tracing::debug!("Recording order processed event");
        swallow(
            self.registry
                .observe(ORDER_PROCESSING_DURATION_SECONDS, &[], elapsed.as_secs_f64()),
            "order_processed",
        );
    }

    fn record_db_query(&self, elapsed: Duration) {
        swallow(
            self.registry
                .observe(DATABASE_QUERY_DURATION_SECONDS, &[], elapsed.as_secs_f64()),
            "db_query",
        );
    }

    fn record_business_operation(&self, operation_type: &str, status: &str) {
        swallow(
            self.registry.increment(
                BUSINESS_OPERATIONS_TOTAL,
                &[("operation_type", operation_type), ("status", status)],
                1.0,
            ),
            "business_operation",
        );
    }

    fn record_cache_access(&self, cache_type: &str, hit: bool) {
        let family = if hit { CACHE_HITS_TOTAL } else { CACHE_MISSES_TOTAL };
        swallow(
            self.registry.increment(family, &[("cache_type", cache_type)], 1.0),
            "cache_access",
        );
    }

    fn record_error(&self, error_type: &str) {
        swallow(
            self.registry.increment(ERRORS_TOTAL, &[("error_type", error_type)], 1.0),
            "error",
        );
    }

    fn set_database_connections(&self, connections: u32) {
        swallow(
            self.registry
                .set(DATABASE_CONNECTIONS_ACTIVE, &[], f64::from(connections)),
            "database_connections",
        );
    }

    fn set_uptime(&self, uptime: Duration) {
        swallow(
            self.registry.set(PROCESS_UPTIME_SECONDS, &[], uptime.as_secs_f64()),
            "uptime",
        );
    }

    fn set_system_usage(&self, usage: SystemUsage) {
        // ---
        for (name, value) in [
            (SYSTEM_CPU_USAGE_PERCENT, usage.cpu_percent),
            (SYSTEM_MEMORY_USAGE_PERCENT, usage.memory_percent),
            (SYSTEM_DISK_USAGE_PERCENT, usage.disk_percent),
        ] {
            swallow(self.registry.set(name, &[], value), "system_usage");
        }
    }
}
