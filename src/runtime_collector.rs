//! Background refresh of process and host gauges.
//!
//! Request and business metrics are recorded as events happen. Uptime, host
//! resource usage and the simulated connection pool have no such event, so a
//! single task samples them on a fixed interval.

use crate::domain::{MetricsPtr, SystemUsage};
use crate::simulation::Simulator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use sysinfo::{Disks, System};

/// Samples host CPU, memory and disk usage.
///
/// CPU usage is measured between two refreshes, so the first sample after
/// construction reads as idle.
pub struct SystemSampler {
    system: System,
}

impl SystemSampler {
    pub fn new() -> Self {
        // ---
        let mut system = System::new();
        system.refresh_cpu_usage();
        SystemSampler { system }
    }

    pub fn sample(&mut self) -> SystemUsage {
        // ---
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let (total_space, available_space) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, available), disk| {
                (
                    total.saturating_add(disk.total_space()),
                    available.saturating_add(disk.available_space()),
                )
            });

        SystemUsage {
            cpu_percent: clamp_percent(f64::from(self.system.global_cpu_usage())),
            memory_percent: percent(self.system.used_memory(), self.system.total_memory()),
            disk_percent: percent(total_space.saturating_sub(available_space), total_space),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        clamp_percent(used as f64 / total as f64 * 100.0)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Periodically refresh process-level gauges until the task is aborted.
///
/// Every `interval` this updates the uptime gauge, the host CPU, memory and
/// disk usage gauges, and a simulated database connection-pool gauge
/// (10 to 50 connections) drawn from the shared simulator.
pub fn spawn_runtime_collector(
    metrics: MetricsPtr,
    simulator: Arc<Simulator>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    // ---
    let started = Instant::now();

    tokio::spawn(async move {
        let mut sampler = SystemSampler::new();
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            metrics.set_uptime(started.elapsed());
            metrics.set_system_usage(sampler.sample());
            metrics.set_database_connections(simulator.between(10, 50) as u32);
            tracing::trace!("Runtime metrics refreshed");
        }
    })
}
