use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregate health of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Up,
    Degraded,
    Down,
}

/// Health of a single dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

/// Health payload returned by `GET /health`. Computed fresh on every query.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    #[serde(rename = "status")]
    pub overall: OverallStatus,
    pub components: BTreeMap<String, ComponentStatus>,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub uptime_seconds: f64,
}

/// Abstraction for a dependency liveness check.
#[async_trait::async_trait]
pub trait HealthProbe: Send + Sync {
    // ---
    /// Component name reported in the health payload.
    fn name(&self) -> &str;

    /// Whether this dependency being down takes the whole service down.
    fn required(&self) -> bool;

    /// Succeeds if the dependency is reachable.
    async fn check(&self) -> Result<()>;
}

/// Type alias for any probe implementation.
pub type ProbePtr = Arc<dyn HealthProbe>;
