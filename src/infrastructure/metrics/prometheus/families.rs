//! Metric families exposed by the service.
//!
//! Everything is declared here, once, at startup. Recording code refers to
//! families by the constants below so a typo is a compile error rather than
//! an `UnknownFamily` at request time.

use crate::registry::{FamilyDesc, Registry, RegistryError, DEFAULT_BUCKETS};

pub const REQUESTS_TOTAL: &str = "requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "request_duration_seconds";
pub const ACTIVE_CONNECTIONS: &str = "active_connections";
pub const ERRORS_TOTAL: &str = "errors_total";
pub const BUSINESS_OPERATIONS_TOTAL: &str = "business_operations_total";
pub const USER_REGISTRATIONS_TOTAL: &str = "user_registrations_total";
pub const ORDER_PROCESSING_DURATION_SECONDS: &str = "order_processing_duration_seconds";
pub const DATABASE_QUERY_DURATION_SECONDS: &str = "database_query_duration_seconds";
pub const DATABASE_CONNECTIONS_ACTIVE: &str = "database_connections_active";
pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
pub const PROCESS_UPTIME_SECONDS: &str = "process_uptime_seconds";
pub const SYSTEM_CPU_USAGE_PERCENT: &str = "system_cpu_usage_percent";
pub const SYSTEM_MEMORY_USAGE_PERCENT: &str = "system_memory_usage_percent";
pub const SYSTEM_DISK_USAGE_PERCENT: &str = "system_disk_usage_percent";

/// Request latency buckets: sub-millisecond up to multi-second.
pub const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Every family the service records into.
pub fn descriptors() -> Vec<FamilyDesc> {
    // ---
    vec![
        FamilyDesc::counter(REQUESTS_TOTAL, &["method", "route", "status"])
            .help("Total number of HTTP requests by method, route template and status class"),
        FamilyDesc::histogram(REQUEST_DURATION_SECONDS, &["method", "route"])
            .buckets(REQUEST_DURATION_BUCKETS)
            .help("HTTP request duration in seconds"),
        FamilyDesc::gauge(ACTIVE_CONNECTIONS, &[]).help("Number of requests currently in flight"),
        FamilyDesc::counter(ERRORS_TOTAL, &["error_type"]).help("Total number of errors"),
        FamilyDesc::counter(BUSINESS_OPERATIONS_TOTAL, &["operation_type", "status"])
            .help("Total business operations"),
        FamilyDesc::counter(USER_REGISTRATIONS_TOTAL, &[]).help("Total user registrations"),
        FamilyDesc::histogram(ORDER_PROCESSING_DURATION_SECONDS, &[])
            .buckets(DEFAULT_BUCKETS)
            .help("Order processing time in seconds"),
        FamilyDesc::histogram(DATABASE_QUERY_DURATION_SECONDS, &[])
            .buckets(DEFAULT_BUCKETS)
            .help("Database query duration in seconds"),
        FamilyDesc::gauge(DATABASE_CONNECTIONS_ACTIVE, &[]).help("Active database connections"),
        FamilyDesc::counter(CACHE_HITS_TOTAL, &["cache_type"]).help("Cache hits"),
        FamilyDesc::counter(CACHE_MISSES_TOTAL, &["cache_type"]).help("Cache misses"),
        FamilyDesc::gauge(PROCESS_UPTIME_SECONDS, &[]).help("Seconds since the process started"),
        FamilyDesc::gauge(SYSTEM_CPU_USAGE_PERCENT, &[]).help("System CPU usage percentage"),
        FamilyDesc::gauge(SYSTEM_MEMORY_USAGE_PERCENT, &[]).help("System memory usage percentage"),
        FamilyDesc::gauge(SYSTEM_DISK_USAGE_PERCENT, &[]).help("System disk usage percentage"),
    ]
}

/// Register every family. Any failure here is a programming error and aborts startup.
pub fn register_all(registry: &Registry) -> Result<(), RegistryError> {
    // ---
    for desc in descriptors() {
        registry.register(desc)?;
    }
    Ok(())
}
