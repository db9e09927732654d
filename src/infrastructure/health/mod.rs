mod tcp_probe;

pub use tcp_probe::TcpProbe;

use crate::config::{DependencyTarget, HealthConfig};
use crate::domain::ProbePtr;
use std::sync::Arc;

/// Creates one TCP probe per dependency declared in configuration.
pub fn create_tcp_probes(config: &HealthConfig) -> Vec<ProbePtr> {
    // ---
    let required = config.required.iter().map(|t| probe(t, true));
    let optional = config.optional.iter().map(|t| probe(t, false));

    required.chain(optional).collect()
}

fn probe(target: &DependencyTarget, required: bool) -> ProbePtr {
    Arc::new(TcpProbe::new(&target.name, &target.addr, required))
}
