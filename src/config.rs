// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Every setting has a sensible default; values that are present but
//! malformed are treated as deployment errors rather than silently ignored
//! wherever a wrong guess would change behavior (metrics backend, probe
//! targets).

use anyhow::{anyhow, Result};
use std::str::FromStr;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable that must parse if present.
///
/// # Behavior
/// - Missing variable: the default is used
/// - Present but unparseable: fails fast with a message naming the key
macro_rules! strict_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        match std::env::var($key) {
            Ok(raw) => raw.parse::<$ty>().map_err(|err| {
                anyhow::anyhow!(concat!("Invalid configuration for ", $key, ": {}"), err)
            })?,
            Err(_) => $default,
        }
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails because of a malformed
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration for ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: metrics::MetricsConfig,
    pub health: health::HealthConfig,
    pub simulation: simulation::SimulationConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any present configuration value is invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            metrics: metrics::MetricsConfig::from_env()?,
            health: health::HealthConfig::from_env()?,
            simulation: simulation::SimulationConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// HTTP listener configuration.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Address the API binds to. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,
    }

    impl Default for ServerConfig {
        fn default() -> Self {
            Self {
                bind_addr: "127.0.0.1:8080".to_string(),
            }
        }
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr =
                std::env::var("API_BIND_ADDR").unwrap_or_else(|_| Self::default().bind_addr);

            Ok(Self { bind_addr })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;

    /// Which `Metrics` implementation backs the service.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum MetricsBackend {
        /// In-process registry rendered in Prometheus text format.
        #[default]
        Registry,
        /// Discard everything; `/metrics` renders an empty body.
        Noop,
    }

    impl FromStr for MetricsBackend {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "registry" | "prom" | "prometheus" => Ok(MetricsBackend::Registry),
                "noop" | "none" | "off" => Ok(MetricsBackend::Noop),
                other => Err(anyhow!("unknown metrics backend `{other}`")),
            }
        }
    }

    /// Metrics subsystem configuration.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend selected by `AXUM_METRICS_TYPE`. Defaults to the registry.
        pub backend: MetricsBackend,

        /// Maximum distinct label combinations per family. Defaults to 1000.
        pub max_series_per_family: usize,

        /// How often the runtime collector refreshes process gauges. Defaults to 10 seconds.
        pub collector_interval: Duration,
    }

    impl Default for MetricsConfig {
        fn default() -> Self {
            Self {
                backend: MetricsBackend::Registry,
                max_series_per_family: crate::registry::DEFAULT_SERIES_LIMIT,
                collector_interval: Duration::from_secs(10),
            }
        }
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `AXUM_METRICS_TYPE` names an unknown backend, or
        /// if `AXUM_METRICS_MAX_SERIES` is malformed or too small to hold every
        /// `requests_total` series the middleware can produce.
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = strict_env_parse!("AXUM_METRICS_TYPE", MetricsBackend, MetricsBackend::Registry);
            let max_series_per_family = strict_env_parse!(
                "AXUM_METRICS_MAX_SERIES",
                usize,
                crate::registry::DEFAULT_SERIES_LIMIT
            );
            let floor = crate::middleware::REQUEST_SERIES_BOUND;
            if max_series_per_family < floor {
                return Err(anyhow!(
                    "Invalid configuration for AXUM_METRICS_MAX_SERIES: {max_series_per_family} is below the minimum of {floor}"
                ));
            }
            let interval_secs = optional_env_parse!("AXUM_COLLECTOR_INTERVAL_SEC", u64, 10);

            Ok(Self {
                backend,
                max_series_per_family,
                collector_interval: Duration::from_secs(interval_secs.max(1)),
            })
        }
    }
}
pub use metrics::{MetricsBackend, MetricsConfig};

// ============================================================
// Health configuration
// ============================================================

mod health {
    // ---
    use super::*;

    /// A named `host:port` dependency checked by the health reporter.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DependencyTarget {
        pub name: String,
        pub addr: String,
    }

    /// Comma separated `name=host:port` entries. Blank input is an empty list.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct DependencyList(pub Vec<DependencyTarget>);

    impl FromStr for DependencyList {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self> {
            let mut targets = Vec::new();
            for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let (name, addr) = entry
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected name=host:port, got `{entry}`"))?;
                let (name, addr) = (name.trim(), addr.trim());
                if name.is_empty() || !addr.contains(':') {
                    return Err(anyhow!("expected name=host:port, got `{entry}`"));
                }
                targets.push(DependencyTarget {
                    name: name.to_string(),
                    addr: addr.to_string(),
                });
            }
            Ok(DependencyList(targets))
        }
    }

    /// Health reporter configuration.
    #[derive(Debug, Clone)]
    pub struct HealthConfig {
        /// Upper bound on each probe. Defaults to 2 seconds.
        pub probe_timeout: Duration,

        /// Dependencies whose failure marks the service `down`.
        pub required: Vec<DependencyTarget>,

        /// Dependencies whose failure only marks the service `degraded`.
        pub optional: Vec<DependencyTarget>,
    }

    impl Default for HealthConfig {
        fn default() -> Self {
            Self {
                probe_timeout: Duration::from_millis(2000),
                required: Vec::new(),
                optional: Vec::new(),
            }
        }
    }

    impl HealthConfig {
        /// Builds a [`HealthConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if a dependency list is malformed.
        pub fn from_env() -> Result<Self> {
            // ---
            let timeout_ms = optional_env_parse!("AXUM_HEALTH_PROBE_TIMEOUT_MS", u64, 2000);
            let required = strict_env_parse!("AXUM_HEALTH_REQUIRED", DependencyList, DependencyList::default());
            let optional = strict_env_parse!("AXUM_HEALTH_OPTIONAL", DependencyList, DependencyList::default());

            Ok(Self {
                probe_timeout: Duration::from_millis(timeout_ms),
                required: required.0,
                optional: optional.0,
            })
        }
    }
}
pub use health::{DependencyList, DependencyTarget, HealthConfig};

// ============================================================
// Simulation configuration
// ============================================================

mod simulation {
    // ---
    use super::*;

    /// Inclusive millisecond range written as `min..max`.
    ///
    /// The start never exceeds the end.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DelayRange {
        min_ms: u64,
        max_ms: u64,
    }

    impl DelayRange {
        pub const ZERO: DelayRange = DelayRange::fixed(0, 0);

        /// # Errors
        /// Returns an error if `min_ms` exceeds `max_ms`.
        pub fn new(min_ms: u64, max_ms: u64) -> Result<Self> {
            if min_ms > max_ms {
                return Err(anyhow!("range start {min_ms} exceeds end {max_ms}"));
            }
            Ok(Self { min_ms, max_ms })
        }

        /// Built-in ranges, ordered by construction.
        const fn fixed(min_ms: u64, max_ms: u64) -> Self {
            Self { min_ms, max_ms }
        }

        pub const fn min_ms(&self) -> u64 {
            self.min_ms
        }

        pub const fn max_ms(&self) -> u64 {
            self.max_ms
        }
    }

    impl FromStr for DelayRange {
        type Err = anyhow::Error;

        fn from_str(s: &str) -> Result<Self> {
            let (min, max) = s
                .split_once("..")
                .ok_or_else(|| anyhow!("expected min..max, got `{s}`"))?;
            let min_ms: u64 = min.trim().parse()?;
            let max_ms: u64 = max.trim().parse()?;
            Self::new(min_ms, max_ms)
        }
    }

    /// Simulated latency and randomness for the demo endpoints.
    #[derive(Debug, Clone)]
    pub struct SimulationConfig {
        /// Seed for reproducible runs. `None` seeds from OS entropy.
        pub seed: Option<u64>,

        /// Artificial delay for `/simulate/load`. Defaults to `10..1500`.
        pub load_delay: DelayRange,

        /// Registration processing delay. Defaults to `100..500`.
        pub register_delay: DelayRange,

        /// Order processing delay. Defaults to `500..2000`.
        pub order_delay: DelayRange,

        /// Simulated database query delay during order processing. Defaults to `100..300`.
        pub db_query_delay: DelayRange,
    }

    impl Default for SimulationConfig {
        fn default() -> Self {
            Self {
                seed: None,
                load_delay: DelayRange::fixed(10, 1500),
                register_delay: DelayRange::fixed(100, 500),
                order_delay: DelayRange::fixed(500, 2000),
                db_query_delay: DelayRange::fixed(100, 300),
            }
        }
    }

    impl SimulationConfig {
        /// Builds a [`SimulationConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let defaults = Self::default();
            let seed = std::env::var("AXUM_SIM_SEED").ok().and_then(|v| v.parse().ok());

            Ok(Self {
                seed,
                load_delay: strict_env_parse!("AXUM_SIM_LOAD_DELAY_MS", DelayRange, defaults.load_delay),
                register_delay: strict_env_parse!(
                    "AXUM_SIM_REGISTER_DELAY_MS",
                    DelayRange,
                    defaults.register_delay
                ),
                order_delay: strict_env_parse!("AXUM_SIM_ORDER_DELAY_MS", DelayRange, defaults.order_delay),
                db_query_delay: strict_env_parse!("AXUM_SIM_DB_DELAY_MS", DelayRange, defaults.db_query_delay),
            })
        }

        /// No artificial latency at all; handy for tests.
        pub fn instant(seed: u64) -> Self {
            let none = DelayRange::ZERO;
            Self {
                seed: Some(seed),
                load_delay: none,
                register_delay: none,
                order_delay: none,
                db_query_delay: none,
            }
        }
    }
}
pub use simulation::{DelayRange, SimulationConfig};

// ============================================================
// Tests
// ============================================================
