use crate::registry::RegistrySnapshot;
use std::sync::Arc;
use std::time::Duration;

/// How a request ended, as seen by the instrumentation middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The handler produced a response with this status code.
    Completed(u16),
    /// The handler future was dropped (client went away) or panicked.
    Aborted,
}

impl RequestOutcome {
    /// Bounded label value: `1xx`..`5xx`, or `aborted`.
    pub fn status_class(self) -> &'static str {
        match self {
            RequestOutcome::Completed(code) => match code {
                100..=199 => "1xx",
                200..=299 => "2xx",
                300..=399 => "3xx",
                400..=499 => "4xx",
                _ => "5xx",
            },
            RequestOutcome::Aborted => "aborted",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self.status_class(), "5xx" | "aborted")
    }
}

/// Abstraction for application metrics (counters, gauges, histograms).
///
/// Every recording call is fire-and-forget: implementations must never fail
/// or panic on behalf of the caller.
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Point-in-time copy of every metric family.
    fn snapshot(&self) -> RegistrySnapshot;

    /// Record the outcome and duration of one HTTP request.
    fn record_http_request(&self, method: &str, route: &str, outcome: RequestOutcome, elapsed: Duration);

    /// A request entered the service.
    fn connection_opened(&self);

    /// A request left the service, however it ended.
    fn connection_closed(&self);

    /// Record a "user registered" event.
    fn record_user_registration(&self);

    /// Record how long one order took to process end to end.
    fn record_order_processed(&self, elapsed: Duration);

    /// Record the duration of one (simulated) database query.
    fn record_db_query(&self, elapsed: Duration);

    /// Record a business operation and how it ended (`success` / `error`).
    fn record_business_operation(&self, operation_type: &str, status: &str);

    /// Record a cache lookup.
    fn record_cache_access(&self, cache_type: &str, hit: bool);

    /// Record an application error by type.
    fn record_error(&self, error_type: &str);

    fn set_database_connections(&self, connections: u32);

    fn set_uptime(&self, uptime: Duration);

    /// Host resource usage, each figure a percentage in `[0, 100]`.
    fn set_system_usage(&self, usage: SystemUsage);
}

/// One sample of host resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
