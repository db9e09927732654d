//! Controllable randomness for the demo and simulation endpoints.
//!
//! All random choices go through one seedable generator so that a run with
//! `AXUM_SIM_SEED` set is reproducible. The generator lock is only ever held
//! for the duration of a single draw, never across an `.await`.

use crate::config::{DelayRange, SimulationConfig};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use uuid::Uuid;

pub const OPERATION_TYPES: &[&str] = &["read", "write", "update", "delete"];
pub const CACHE_TYPES: &[&str] = &["redis", "memcached", "local"];
pub const ERROR_TYPES: &[&str] = &[
    "database_error",
    "network_error",
    "validation_error",
    "timeout_error",
];

/// Outcome of one synthetic operation generated by `/simulate/load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticOperation {
    pub operation_type: &'static str,
    pub success: bool,
    pub cache_type: &'static str,
    pub cache_hit: bool,
}

pub struct Simulator {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        // ---
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Simulator {
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Draw a delay uniformly from `range` (inclusive).
    pub fn delay(&self, range: DelayRange) -> Duration {
        let ms = self.rng.lock().gen_range(range.min_ms()..=range.max_ms());
        Duration::from_millis(ms)
    }

    /// Sleep for a delay drawn from `range` and return how long was requested.
    pub async fn pause(&self, range: DelayRange) -> Duration {
        // The draw releases the generator before the task suspends.
        let delay = self.delay(range);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        delay
    }

    /// Pick one entry of a non-empty list.
    pub fn pick(&self, choices: &[&'static str]) -> &'static str {
        choices.choose(&mut *self.rng.lock()).copied().unwrap_or("unknown")
    }

    pub fn chance(&self, probability: f64) -> bool {
        self.rng.lock().gen_bool(probability.clamp(0.0, 1.0))
    }

    pub fn between(&self, low: u64, high: u64) -> u64 {
        self.rng.lock().gen_range(low..=high)
    }

    /// Random (version 4) identifier drawn from the shared generator.
    pub fn uuid(&self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.lock().fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    /// Generate a batch of 10 to 100 synthetic operations, 75% successful.
    pub fn operations(&self) -> Vec<SyntheticOperation> {
        // ---
        let mut rng = self.rng.lock();
        let count = rng.gen_range(10..=100);

        (0..count)
            .map(|_| SyntheticOperation {
                operation_type: OPERATION_TYPES.choose(&mut *rng).copied().unwrap_or("read"),
                success: rng.gen_bool(0.75),
                cache_type: CACHE_TYPES.choose(&mut *rng).copied().unwrap_or("local"),
                cache_hit: rng.gen_bool(0.5),
            })
            .collect()
    }
}
