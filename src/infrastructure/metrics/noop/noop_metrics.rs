use crate::domain::{Metrics, RequestOutcome, SystemUsage};
use crate::registry::RegistrySnapshot;
use std::time::Duration;

/// No-op metrics implementation for testing or when metrics are disabled.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Default for NoopMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::default()
    }
    fn record_http_request(&self, _: &str, _: &str, _: RequestOutcome, _: Duration) {}
    fn connection_opened(&self) {}
    fn connection_closed(&self) {}
    fn record_user_registration(&self) {}
    fn record_order_processed(&self, _: Duration) {}
    fn record_db_query(&self, _: Duration) {}
    fn record_business_operation(&self, _: &str, _: &str) {}
    fn record_cache_access(&self, _: &str, _: bool) {}
    fn record_error(&self, _: &str) {}
    fn set_database_connections(&self, _: u32) {}
    fn set_uptime(&self, _: Duration) {}
    fn set_system_usage(&self, _: SystemUsage) {}
}
