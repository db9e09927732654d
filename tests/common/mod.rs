// Test helpers are intentionally partially used
#![allow(dead_code)]

use async_trait::async_trait;
use axum_observability::domain::{HealthProbe, MetricsPtr, ProbePtr};
use axum_observability::{build_router, AppConfig, MetricsBackend, SimulationConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

// ============================================================================
// Test Setup
// ============================================================================

/// Configuration with a fixed seed and no artificial latency.
pub fn test_config(backend: MetricsBackend) -> AppConfig {
    // ---
    let mut config = AppConfig {
        simulation: SimulationConfig::instant(42),
        ..AppConfig::default()
    };
    config.metrics.backend = backend;
    config
}

/// Probe with a fixed verdict, standing in for a real dependency.
pub struct StaticProbe {
    name: &'static str,
    required: bool,
    healthy: bool,
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn name(&self) -> &str {
        self.name
    }

    fn required(&self) -> bool {
        self.required
    }

    async fn check(&self) -> anyhow::Result<()> {
        if self.healthy {
            Ok(())
        } else {
            anyhow::bail!("{} unreachable", self.name)
        }
    }
}

pub fn probe(name: &'static str, required: bool, healthy: bool) -> ProbePtr {
    Arc::new(StaticProbe {
        name,
        required,
        healthy,
    })
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    pub metrics: MetricsPtr,
}

impl TestServer {
    // ---
    /// Registry-backed server without health dependencies.
    pub async fn new() -> Self {
        // --
        Self::start(test_config(MetricsBackend::Registry), vec![]).await
    }

    pub async fn start(config: AppConfig, probes: Vec<ProbePtr>) -> Self {
        // --

        // Enable debug logging only when requested
        if std::env::var("TEST_DEBUG").is_ok() {
            std::env::set_var("RUST_LOG", "debug");
            std::env::set_var("NO_COLOR", "1");
        }

        let service = build_router(&config, probes).expect("Should be able to create router");
        let (app, metrics) = (service.router, service.metrics);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self {
            addr,
            client,
            metrics,
        }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// Fetch `/metrics` and return the exposition body.
    pub async fn scrape(&self) -> String {
        // ---
        let response = self
            .client
            .get(self.url("/metrics"))
            .send()
            .await
            .expect("Failed to scrape metrics");
        assert_eq!(response.status(), 200);
        response.text().await.expect("Failed to read metrics body")
    }
}

/// Value of the first exposition line starting with `prefix`, if any.
pub fn sample_value(body: &str, prefix: &str) -> Option<f64> {
    // ---
    body.lines()
        .find(|line| line.starts_with(prefix))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}
