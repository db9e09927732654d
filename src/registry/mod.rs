//! In-memory metric registry.
//!
//! The registry owns every metric family, keyed by name. Families are
//! declared once at startup with a fixed type and label schema; individual
//! series (label combinations) are created lazily on first observation and
//! live for the rest of the process.
//!
//! # Locking
//!
//! The family map is guarded by a read-mostly `RwLock` that is only written
//! during registration. Each family guards its own series with a separate
//! mutex, so updates to unrelated families never contend with each other and
//! a snapshot of one family is always a single point in time.

mod error;
pub mod exposition;
mod family;
mod snapshot;

pub use error::RegistryError;
pub use family::{FamilyDesc, MetricType, DEFAULT_BUCKETS};
pub use snapshot::{FamilySnapshot, RegistrySnapshot, SampleValue, SeriesSnapshot};

use family::{Family, SeriesValue};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default cap on distinct label combinations per family.
pub const DEFAULT_SERIES_LIMIT: usize = 1000;

/// Thread-safe store of metric families.
pub struct Registry {
    families: RwLock<BTreeMap<String, Arc<Family>>>,
    series_limit: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::with_series_limit(DEFAULT_SERIES_LIMIT)
    }

    pub fn with_series_limit(series_limit: usize) -> Self {
        Registry {
            families: RwLock::new(BTreeMap::new()),
            series_limit,
        }
    }

    /// Register a family.
    ///
    /// Registering an identical schema twice is a no-op. A name that is
    /// already taken by a different schema fails with
    /// [`RegistryError::DuplicateFamily`].
    pub fn register(&self, desc: FamilyDesc) -> Result<(), RegistryError> {
        // ---
        desc.validate()?;

        let mut families = self.families.write();
        if let Some(existing) = families.get(&desc.name) {
            if existing.desc.same_schema(&desc) {
                return Ok(());
            }
            return Err(RegistryError::DuplicateFamily { name: desc.name });
        }

        tracing::debug!(family = %desc.name, kind = %desc.kind, "Registered metric family");
        families.insert(desc.name.clone(), Arc::new(Family::new(desc)));
        Ok(())
    }

    /// Add `delta` to a counter.
    pub fn increment(
        &self,
        name: &str,
        labels: &[(&str, &str)],
        delta: f64,
    ) -> Result<(), RegistryError> {
        // ---
        if !(delta >= 0.0 && delta.is_finite()) {
            return Err(RegistryError::InvalidValue {
                name: name.to_string(),
                value: delta,
                reason: "counter increments must be finite and non-negative",
            });
        }

        self.apply(name, MetricType::Counter, labels, |value| {
            if let SeriesValue::Counter(v) = value {
                *v += delta;
            }
        })
    }

    /// Overwrite a gauge.
    pub fn set(&self, name: &str, labels: &[(&str, &str)], value: f64) -> Result<(), RegistryError> {
        // ---
        self.apply(name, MetricType::Gauge, labels, |series| {
            if let SeriesValue::Gauge(v) = series {
                *v = value;
            }
        })
    }

    /// Add a signed `delta` to a gauge.
    pub fn adjust(&self, name: &str, labels: &[(&str, &str)], delta: f64) -> Result<(), RegistryError> {
        // ---
        self.apply(name, MetricType::Gauge, labels, |series| {
            if let SeriesValue::Gauge(v) = series {
                *v += delta;
            }
        })
    }

    /// Record one observation in a histogram.
    pub fn observe(&self, name: &str, labels: &[(&str, &str)], value: f64) -> Result<(), RegistryError> {
        // ---
        if value.is_nan() {
            return Err(RegistryError::InvalidValue {
                name: name.to_string(),
                value,
                reason: "histogram observations must not be NaN",
            });
        }

        let family = self.family(name, MetricType::Histogram)?;
        let key = family.label_values(labels)?;
        let bounds = &family.desc.buckets;

        family.update(
            key,
            self.series_limit,
            || family.empty_value(),
            |series| {
                if let SeriesValue::Histogram(h) = series {
                    for (count, bound) in h.buckets.iter_mut().zip(bounds) {
                        if value <= *bound {
                            *count += 1;
                        }
                    }
                    h.sum += value;
                    h.count += 1;
                }
            },
        )
    }

    /// Copy every family. Each family is copied under its own lock.
    pub fn snapshot(&self) -> RegistrySnapshot {
        // ---
        // Clone the handles first so no family lock is taken while the map is held.
        let families: Vec<Arc<Family>> = self.families.read().values().cloned().collect();

        RegistrySnapshot {
            families: families.iter().map(|f| f.snapshot()).collect(),
        }
    }

    fn apply<F>(
        &self,
        name: &str,
        kind: MetricType,
        labels: &[(&str, &str)],
        update: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut SeriesValue),
    {
        let family = self.family(name, kind)?;
        let key = family.label_values(labels)?;
        family.update(key, self.series_limit, || family.empty_value(), update)
    }

    fn family(&self, name: &str, expected: MetricType) -> Result<Arc<Family>, RegistryError> {
        let family = self
            .families
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownFamily {
                name: name.to_string(),
            })?;

        if family.desc.kind != expected {
            return Err(RegistryError::WrongType {
                name: name.to_string(),
                expected,
                actual: family.desc.kind,
            });
        }
        Ok(family)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    fn counter_value(registry: &Registry, name: &str, labels: &[(&str, &str)]) -> f64 {
        registry.snapshot().sum(name, labels)
    }

    #[test]
    fn register_is_idempotent_for_identical_schema() {
        // ---
        let registry = Registry::new();
        let desc = FamilyDesc::counter("requests_total", &["method", "route"]);

        registry.register(desc.clone()).unwrap();
        registry.register(desc.help("ignored for compatibility")).unwrap();

        registry
            .increment("requests_total", &[("method", "GET"), ("route", "/health")], 1.0)
            .unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.families.len(), 1);
        assert_eq!(snapshot.sum("requests_total", &[]), 1.0);
    }

    #[test]
    fn register_with_incompatible_schema_fails() {
        // ---
        let registry = Registry::new();
        registry
            .register(FamilyDesc::counter("jobs_total", &["status"]))
            .unwrap();

        let wrong_type = registry.register(FamilyDesc::gauge("jobs_total", &["status"]));
        assert_eq!(
            wrong_type,
            Err(RegistryError::DuplicateFamily {
                name: "jobs_total".into()
            })
        );

        let wrong_labels = registry.register(FamilyDesc::counter("jobs_total", &["kind"]));
        assert!(matches!(wrong_labels, Err(RegistryError::DuplicateFamily { .. })));
    }

    #[test]
    fn histogram_schema_includes_buckets() {
        // ---
        let registry = Registry::new();
        registry
            .register(FamilyDesc::histogram("latency_seconds", &[]).buckets(&[0.1, 1.0]))
            .unwrap();

        let result = registry.register(FamilyDesc::histogram("latency_seconds", &[]).buckets(&[0.5]));
        assert!(matches!(result, Err(RegistryError::DuplicateFamily { .. })));
    }

    #[test]
    fn stray_buckets_do_not_split_counter_schema() {
        // ---
        let registry = Registry::new();
        registry.register(FamilyDesc::counter("jobs_total", &[])).unwrap();

        let again = registry.register(FamilyDesc::counter("jobs_total", &[]).buckets(&[1.0, 2.0]));
        assert_eq!(again, Ok(()));

        registry.register(FamilyDesc::gauge("queue_depth", &[]).buckets(&[5.0])).unwrap();
        assert_eq!(registry.register(FamilyDesc::gauge("queue_depth", &[])), Ok(()));
    }

    #[test]
    fn invalid_names_are_rejected() {
        // ---
        let registry = Registry::new();
        assert!(matches!(
            registry.register(FamilyDesc::counter("9lives", &[])),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(FamilyDesc::counter("ok_total", &["bad-label"])),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(FamilyDesc::counter("ok_total", &["a", "a"])),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(FamilyDesc::histogram("h_seconds", &["le"])),
            Err(RegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn histogram_buckets_must_ascend() {
        // ---
        let registry = Registry::new();
        let result = registry.register(FamilyDesc::histogram("h_seconds", &[]).buckets(&[1.0, 0.5]));
        assert!(matches!(result, Err(RegistryError::InvalidValue { .. })));

        let result = registry.register(FamilyDesc::histogram("h_seconds", &[]).buckets(&[]));
        assert!(matches!(result, Err(RegistryError::InvalidValue { .. })));
    }

    #[test]
    fn unknown_family_and_wrong_type() {
        // ---
        let registry = Registry::new();
        registry.register(FamilyDesc::gauge("temperature", &[])).unwrap();

        assert_eq!(
            registry.increment("missing_total", &[], 1.0),
            Err(RegistryError::UnknownFamily {
                name: "missing_total".into()
            })
        );
        assert_eq!(
            registry.increment("temperature", &[], 1.0),
            Err(RegistryError::WrongType {
                name: "temperature".into(),
                expected: MetricType::Counter,
                actual: MetricType::Gauge,
            })
        );
        assert!(matches!(
            registry.observe("temperature", &[], 1.0),
            Err(RegistryError::WrongType { .. })
        ));
    }

    #[test]
    fn label_mismatches_are_rejected() {
        // ---
        let registry = Registry::new();
        registry
            .register(FamilyDesc::counter("requests_total", &["method", "route"]))
            .unwrap();

        let missing = registry.increment("requests_total", &[("method", "GET")], 1.0);
        assert!(matches!(missing, Err(RegistryError::LabelMismatch { .. })));

        let unknown = registry.increment(
            "requests_total",
            &[("method", "GET"), ("path", "/raw/123")],
            1.0,
        );
        assert!(matches!(unknown, Err(RegistryError::LabelMismatch { .. })));

        let duplicate = registry.increment(
            "requests_total",
            &[("method", "GET"), ("method", "POST")],
            1.0,
        );
        assert!(matches!(duplicate, Err(RegistryError::LabelMismatch { .. })));

        // Nothing leaked into the family.
        assert!(registry.snapshot().families[0].samples.is_empty());
    }

    #[test]
    fn labels_resolve_in_declared_order() {
        // ---
        let registry = Registry::new();
        registry
            .register(FamilyDesc::counter("requests_total", &["method", "route"]))
            .unwrap();

        registry
            .increment("requests_total", &[("route", "/orders"), ("method", "POST")], 2.0)
            .unwrap();
        registry
            .increment("requests_total", &[("method", "POST"), ("route", "/orders")], 1.0)
            .unwrap();

        let snapshot = registry.snapshot();
        let family = snapshot.family("requests_total").unwrap();
        assert_eq!(family.samples.len(), 1);
        assert_eq!(family.samples[0].label_values, vec!["POST", "/orders"]);
        assert_eq!(family.samples[0].value, SampleValue::Counter(3.0));
    }

    #[test]
    fn counters_reject_negative_and_non_finite_deltas() {
        // ---
        let registry = Registry::new();
        registry.register(FamilyDesc::counter("c_total", &[])).unwrap();
        registry.increment("c_total", &[], 5.0).unwrap();

        assert!(matches!(
            registry.increment("c_total", &[], -1.0),
            Err(RegistryError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.increment("c_total", &[], f64::NAN),
            Err(RegistryError::InvalidValue { .. })
        ));
        assert!(matches!(
            registry.increment("c_total", &[], f64::INFINITY),
            Err(RegistryError::InvalidValue { .. })
        ));

        assert_eq!(counter_value(&registry, "c_total", &[]), 5.0);
    }

    #[test]
    fn gauges_set_and_adjust() {
        // ---
        let registry = Registry::new();
        registry.register(FamilyDesc::gauge("active_connections", &[])).unwrap();

        registry.set("active_connections", &[], 10.0).unwrap();
        registry.adjust("active_connections", &[], -3.0).unwrap();
        registry.adjust("active_connections", &[], 1.0).unwrap();
        assert_eq!(registry.snapshot().sum("active_connections", &[]), 8.0);

        registry.set("active_connections", &[], -2.5).unwrap();
        assert_eq!(registry.snapshot().sum("active_connections", &[]), -2.5);
    }

    #[test]
    fn histogram_observation_fills_cumulative_buckets() {
        // ---
        let registry = Registry::new();
        registry
            .register(FamilyDesc::histogram("latency_seconds", &[]).buckets(&[0.1, 0.5, 1.0]))
            .unwrap();

        for value in [0.05, 0.1, 0.3, 2.0] {
            registry.observe("latency_seconds", &[], value).unwrap();
        }

        let snapshot = registry.snapshot();
        let series = snapshot.family("latency_seconds").unwrap().find(&[]).unwrap();
        match &series.value {
            SampleValue::Histogram { buckets, sum, count } => {
                assert_eq!(buckets, &vec![(0.1, 2), (0.5, 3), (1.0, 3)]);
                assert_eq!(*count, 4);
                assert!((sum - 2.45).abs() < 1e-9);
            }
            other => panic!("expected histogram, got {other:?}"),
        }

        assert!(matches!(
            registry.observe("latency_seconds", &[], f64::NAN),
            Err(RegistryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn series_limit_bounds_cardinality() {
        // ---
        let registry = Registry::with_series_limit(2);
        registry.register(FamilyDesc::counter("hits_total", &["key"])).unwrap();

        registry.increment("hits_total", &[("key", "a")], 1.0).unwrap();
        registry.increment("hits_total", &[("key", "b")], 1.0).unwrap();
        // Existing series keep accepting updates.
        registry.increment("hits_total", &[("key", "a")], 1.0).unwrap();

        assert_eq!(
            registry.increment("hits_total", &[("key", "c")], 1.0),
            Err(RegistryError::CardinalityExceeded {
                name: "hits_total".into(),
                limit: 2
            })
        );
        assert_eq!(registry.snapshot().sum("hits_total", &[]), 3.0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        // ---
        const THREADS: usize = 8;
        const PER_THREAD: usize = 10_000;

        let registry = Arc::new(Registry::new());
        registry.register(FamilyDesc::counter("hits_total", &["worker"])).unwrap();
        registry
            .register(FamilyDesc::histogram("work_seconds", &[]).buckets(&[0.5]))
            .unwrap();

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let worker = (i % 2).to_string();
                    for _ in 0..PER_THREAD {
                        registry
                            .increment("hits_total", &[("worker", worker.as_str())], 1.0)
                            .unwrap();
                        registry.observe("work_seconds", &[], 1.0).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.sum("hits_total", &[]), (THREADS * PER_THREAD) as f64);
        assert_eq!(snapshot.histogram_totals("work_seconds").1, (THREADS * PER_THREAD) as u64);
    }

    #[test]
    fn snapshots_never_observe_torn_histograms() {
        // ---
        let registry = Arc::new(Registry::new());
        registry
            .register(FamilyDesc::histogram("work_seconds", &[]).buckets(&[0.5, 1.5]))
            .unwrap();

        let writer = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..20_000 {
                    registry.observe("work_seconds", &[], 1.0).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let snapshot = registry.snapshot();
            if let Some(series) = snapshot.family("work_seconds").and_then(|f| f.find(&[])) {
                if let SampleValue::Histogram { buckets, sum, count } = &series.value {
                    // Every observation is exactly 1.0: sum, count and the
                    // 1.5 bucket must always agree.
                    assert_eq!(buckets[1].1, *count);
                    assert_eq!(*sum, *count as f64);
                    assert_eq!(buckets[0].1, 0);
                }
            }
        }

        writer.join().unwrap();
    }

    proptest! {
        #[test]
        fn counter_equals_sum_of_deltas(deltas in proptest::collection::vec(0u32..1000, 0..64)) {
            let registry = Registry::new();
            registry.register(FamilyDesc::counter("c_total", &[])).unwrap();

            let mut previous = 0.0;
            for delta in &deltas {
                registry.increment("c_total", &[], f64::from(*delta)).unwrap();
                let current = counter_value(&registry, "c_total", &[]);
                prop_assert!(current >= previous);
                previous = current;
            }

            let expected: f64 = deltas.iter().map(|d| f64::from(*d)).sum();
            prop_assert_eq!(counter_value(&registry, "c_total", &[]), expected);
        }

        #[test]
        fn histogram_buckets_stay_cumulative(values in proptest::collection::vec(0.0f64..20.0, 1..128)) {
            let registry = Registry::new();
            registry.register(FamilyDesc::histogram("h_seconds", &[])).unwrap();

            for value in &values {
                registry.observe("h_seconds", &[], *value).unwrap();
            }

            let snapshot = registry.snapshot();
            let series = snapshot.family("h_seconds").unwrap().find(&[]).unwrap();
            if let SampleValue::Histogram { buckets, count, .. } = &series.value {
                for pair in buckets.windows(2) {
                    prop_assert!(pair[0].0 < pair[1].0);
                    prop_assert!(pair[0].1 <= pair[1].1);
                }
                prop_assert!(buckets.last().unwrap().1 <= *count);
                prop_assert_eq!(*count, values.len() as u64);
            } else {
                prop_assert!(false, "expected histogram sample");
            }
        }
    }
}
