mod health;
pub mod metrics;

// Re-export the factory functions for easy access
pub use health::{create_tcp_probes, TcpProbe};
pub use metrics::{create_noop_metrics, create_prom_metrics};
