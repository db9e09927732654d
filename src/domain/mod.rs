mod health;
mod metrics;
mod models;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr, RequestOutcome, SystemUsage};

// Publicly expose health abstractions
pub use health::{ComponentStatus, HealthProbe, HealthStatus, OverallStatus, ProbePtr};

// Request payloads
pub use models::{OrderRequest, UserRegistration};
