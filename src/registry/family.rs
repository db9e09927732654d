//! Metric family descriptors and the per-family series store.

use super::error::RegistryError;
use super::snapshot::{FamilySnapshot, SampleValue, SeriesSnapshot};
use parking_lot::Mutex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of a metric family, as written on its `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default histogram buckets, matching the Prometheus client libraries.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Declarative description of a metric family.
///
/// Two descriptors with the same name are compatible when type, label names
/// and buckets agree; help text is informational and does not take part.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDesc {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) kind: MetricType,
    pub(crate) label_names: Vec<String>,
    pub(crate) buckets: Vec<f64>,
}

impl FamilyDesc {
    pub fn counter(name: &str, label_names: &[&str]) -> Self {
        Self::new(name, MetricType::Counter, label_names)
    }

    pub fn gauge(name: &str, label_names: &[&str]) -> Self {
        Self::new(name, MetricType::Gauge, label_names)
    }

    /// Histogram using [`DEFAULT_BUCKETS`]; override with [`FamilyDesc::buckets`].
    pub fn histogram(name: &str, label_names: &[&str]) -> Self {
        let mut desc = Self::new(name, MetricType::Histogram, label_names);
        desc.buckets = DEFAULT_BUCKETS.to_vec();
        desc
    }

    fn new(name: &str, kind: MetricType, label_names: &[&str]) -> Self {
        FamilyDesc {
            name: name.to_string(),
            help: String::new(),
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
            buckets: Vec::new(),
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Replace the bucket upper bounds. Ignored for non-histograms at validation.
    pub fn buckets(mut self, bounds: &[f64]) -> Self {
        self.buckets = bounds.to_vec();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricType {
        self.kind
    }

    pub(crate) fn same_schema(&self, other: &FamilyDesc) -> bool {
        // Buckets only shape histograms; counters and gauges ignore them.
        self.kind == other.kind
            && self.label_names == other.label_names
            && (self.kind != MetricType::Histogram || self.buckets == other.buckets)
    }

    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if !is_valid_metric_name(&self.name) {
            return Err(RegistryError::InvalidName(self.name.clone()));
        }

        for (i, label) in self.label_names.iter().enumerate() {
            if !is_valid_label_name(label) || self.label_names[..i].contains(label) {
                return Err(RegistryError::InvalidName(label.clone()));
            }
            // `le` is emitted by the formatter on every bucket line.
            if self.kind == MetricType::Histogram && label == "le" {
                return Err(RegistryError::InvalidName(label.clone()));
            }
        }

        match self.kind {
            MetricType::Histogram => {
                let ascending = self.buckets.windows(2).all(|w| w[0] < w[1]);
                if self.buckets.is_empty()
                    || !ascending
                    || self.buckets.iter().any(|b| !b.is_finite())
                {
                    return Err(RegistryError::InvalidValue {
                        name: self.name.clone(),
                        value: self.buckets.first().copied().unwrap_or(f64::NAN),
                        reason: "histogram buckets must be finite and strictly ascending",
                    });
                }
            }
            MetricType::Counter | MetricType::Gauge => {}
        }

        Ok(())
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone)]
pub(crate) struct HistogramState {
    /// Cumulative counts, one per declared upper bound.
    pub(crate) buckets: Vec<u64>,
    pub(crate) sum: f64,
    pub(crate) count: u64,
}

#[derive(Debug, Clone)]
pub(crate) enum SeriesValue {
    Counter(f64),
    Gauge(f64),
    Histogram(HistogramState),
}

/// A registered family: its descriptor plus every label combination seen so far.
///
/// The series map sits behind one mutex per family, so each update is applied
/// atomically and a snapshot of the family is a single point in time.
pub(crate) struct Family {
    pub(crate) desc: FamilyDesc,
    series: Mutex<BTreeMap<Vec<String>, SeriesValue>>,
}

impl Family {
    pub(crate) fn new(desc: FamilyDesc) -> Self {
        Family {
            desc,
            series: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolve `(name, value)` pairs into declared label order.
    pub(crate) fn label_values(&self, labels: &[(&str, &str)]) -> Result<Vec<String>, RegistryError> {
        let declared = &self.desc.label_names;
        if labels.len() != declared.len() {
            return Err(self.mismatch(format!(
                "expected {} label(s) {:?}, got {}",
                declared.len(),
                declared,
                labels.len()
            )));
        }

        let mut values: Vec<Option<String>> = vec![None; declared.len()];
        for (name, value) in labels {
            let idx = declared
                .iter()
                .position(|d| d == name)
                .ok_or_else(|| self.mismatch(format!("unknown label `{name}`")))?;
            if values[idx].is_some() {
                return Err(self.mismatch(format!("duplicate label `{name}`")));
            }
            values[idx] = Some(value.to_string());
        }

        // Arity matched and no duplicates, so every slot is filled.
        Ok(values.into_iter().flatten().collect())
    }

    fn mismatch(&self, reason: String) -> RegistryError {
        RegistryError::LabelMismatch {
            name: self.desc.name.clone(),
            reason,
        }
    }

    /// Apply `update` to the series for `key`, creating it from `init` on first use.
    pub(crate) fn update<F>(
        &self,
        key: Vec<String>,
        limit: usize,
        init: impl FnOnce() -> SeriesValue,
        update: F,
    ) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut SeriesValue),
    {
        let mut series = self.series.lock();
        let len = series.len();
        match series.entry(key) {
            Entry::Occupied(mut entry) => update(entry.get_mut()),
            Entry::Vacant(entry) => {
                if len >= limit {
                    return Err(RegistryError::CardinalityExceeded {
                        name: self.desc.name.clone(),
                        limit,
                    });
                }
                update(entry.insert(init()));
            }
        }
        Ok(())
    }

    pub(crate) fn empty_value(&self) -> SeriesValue {
        match self.desc.kind {
            MetricType::Counter => SeriesValue::Counter(0.0),
            MetricType::Gauge => SeriesValue::Gauge(0.0),
            MetricType::Histogram => SeriesValue::Histogram(HistogramState {
                buckets: vec![0; self.desc.buckets.len()],
                sum: 0.0,
                count: 0,
            }),
        }
    }

    pub(crate) fn snapshot(&self) -> FamilySnapshot {
        let series = self.series.lock();
        let samples = series
            .iter()
            .map(|(labels, value)| SeriesSnapshot {
                label_values: labels.clone(),
                value: match value {
                    SeriesValue::Counter(v) => SampleValue::Counter(*v),
                    SeriesValue::Gauge(v) => SampleValue::Gauge(*v),
                    SeriesValue::Histogram(h) => SampleValue::Histogram {
                        buckets: self
                            .desc
                            .buckets
                            .iter()
                            .copied()
                            .zip(h.buckets.iter().copied())
                            .collect(),
                        sum: h.sum,
                        count: h.count,
                    },
                },
            })
            .collect();
        drop(series);

        FamilySnapshot {
            name: self.desc.name.clone(),
            help: self.desc.help.clone(),
            kind: self.desc.kind,
            label_names: self.desc.label_names.clone(),
            samples,
        }
    }
}
