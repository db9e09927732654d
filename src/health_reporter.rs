//! Aggregates dependency probes into a single [`HealthStatus`].

use crate::domain::{ComponentStatus, HealthStatus, OverallStatus, ProbePtr};
use futures::future::join_all;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

pub struct HealthReporter {
    probes: Vec<ProbePtr>,
    probe_timeout: Duration,
    started_at: Instant,
}

impl HealthReporter {
    pub fn new(probes: Vec<ProbePtr>, probe_timeout: Duration) -> Self {
        HealthReporter {
            probes,
            probe_timeout,
            started_at: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Run every probe concurrently, each bounded by the probe timeout.
    ///
    /// A probe that fails, times out or panics marks its own component
    /// `down`; it never fails the check as a whole.
    pub async fn check(&self) -> HealthStatus {
        // ---
        let results = join_all(self.probes.iter().map(|probe| async move {
            let checked = tokio::time::timeout(self.probe_timeout, probe.check());
            let outcome = AssertUnwindSafe(checked).catch_unwind().await;
            let status = match outcome {
                Ok(Ok(Ok(()))) => ComponentStatus::Up,
                Ok(Ok(Err(err))) => {
                    tracing::warn!(component = probe.name(), error = %err, "Health probe failed");
                    ComponentStatus::Down
                }
                Err(_) => {
                    tracing::error!(component = probe.name(), "Health probe panicked");
                    ComponentStatus::Down
                }
                Ok(Err(_)) => {
                    tracing::warn!(
                        component = probe.name(),
                        timeout_ms = self.probe_timeout.as_millis() as u64,
                        "Health probe timed out"
                    );
                    ComponentStatus::Down
                }
            };
            (probe.name().to_string(), probe.required(), status)
        }))
        .await;

        let mut overall = OverallStatus::Up;
        let mut components = BTreeMap::new();
        for (name, required, status) in results {
            if status == ComponentStatus::Down {
                overall = match (overall, required) {
                    (_, true) | (OverallStatus::Down, _) => OverallStatus::Down,
                    _ => OverallStatus::Degraded,
                };
            }
            components.insert(name, status);
        }

        HealthStatus {
            overall,
            components,
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: self.uptime().as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::HealthProbe;
    use anyhow::{anyhow, Result};
    use std::sync::Arc;

    struct FixedProbe {
        name: &'static str,
        required: bool,
        healthy: bool,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl HealthProbe for FixedProbe {
        fn name(&self) -> &str {
            self.name
        }
        fn required(&self) -> bool {
            self.required
        }
        async fn check(&self) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            if self.healthy {
                Ok(())
            } else {
                Err(anyhow!("{} unreachable", self.name))
            }
        }
    }

    fn probe(name: &'static str, required: bool, healthy: bool) -> ProbePtr {
        Arc::new(FixedProbe {
            name,
            required,
            healthy,
            delay: Duration::ZERO,
        })
    }

    fn reporter(probes: Vec<ProbePtr>) -> HealthReporter {
        HealthReporter::new(probes, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn no_probes_is_up() {
        // ---
        let status = reporter(vec![]).check().await;
        assert_eq!(status.overall, OverallStatus::Up);
        assert!(status.components.is_empty());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn all_healthy_is_up() {
        // ---
        let status = reporter(vec![probe("database", true, true), probe("cache", false, true)])
            .check()
            .await;
        assert_eq!(status.overall, OverallStatus::Up);
        assert_eq!(status.components["database"], ComponentStatus::Up);
        assert_eq!(status.components["cache"], ComponentStatus::Up);
    }

    #[tokio::test]
    async fn optional_down_is_degraded() {
        // ---
        let status = reporter(vec![probe("database", true, true), probe("cache", false, false)])
            .check()
            .await;
        assert_eq!(status.overall, OverallStatus::Degraded);
        assert_eq!(status.components["cache"], ComponentStatus::Down);
    }

    #[tokio::test]
    async fn required_down_is_down() {
        // ---
        let status = reporter(vec![
            probe("cache", false, false),
            probe("database", true, false),
            probe("search", false, true),
        ])
        .check()
        .await;
        assert_eq!(status.overall, OverallStatus::Down);
        assert_eq!(status.components["database"], ComponentStatus::Down);
        assert_eq!(status.components["search"], ComponentStatus::Up);
    }

    #[tokio::test]
    async fn slow_probe_times_out_as_down() {
        // ---
        let slow: ProbePtr = Arc::new(FixedProbe {
            name: "database",
            required: true,
            healthy: true,
            delay: Duration::from_secs(30),
        });

        let started = Instant::now();
        let status = HealthReporter::new(vec![slow, probe("cache", false, true)], Duration::from_millis(50))
            .check()
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(status.overall, OverallStatus::Down);
        assert_eq!(status.components["database"], ComponentStatus::Down);
        assert_eq!(status.components["cache"], ComponentStatus::Up);
    }

    struct PanickingDependency;

    #[async_trait::async_trait]
    impl HealthProbe for PanickingDependency {
        fn name(&self) -> &str {
            "search"
        }
        fn required(&self) -> bool {
            false
        }
        async fn check(&self) -> Result<()> {
            panic!("driver bug")
        }
    }

    #[tokio::test]
    async fn panicking_dependency_is_down_not_fatal() {
        // ---
        let probes = vec![probe("database", true, true), Arc::new(PanickingDependency) as ProbePtr];
        let handle = tokio::spawn(async move { reporter(probes).check().await });

        let status = handle.await.expect("health check must survive a panicking dependency");
        assert_eq!(status.overall, OverallStatus::Degraded);
        assert_eq!(status.components["search"], ComponentStatus::Down);
        assert_eq!(status.components["database"], ComponentStatus::Up);
    }

    #[tokio::test]
    async fn serializes_lowercase_statuses() {
        // ---
        let status = reporter(vec![probe("cache", false, false)]).check().await;
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["status"], "degraded");
        assert_eq!(json["components"]["cache"], "down");
        assert!(json["uptime_seconds"].is_number());
        assert!(json["timestamp"].is_string());
    }
}
