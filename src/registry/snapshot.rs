//! Immutable, point-in-time copies of registry state.

use super::MetricType;

/// Value of a single series at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Counter(f64),
    Gauge(f64),
    /// `buckets` pairs each declared upper bound with its cumulative count;
    /// the implicit `+Inf` bucket equals `count`.
    Histogram {
        buckets: Vec<(f64, u64)>,
        sum: f64,
        count: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    /// Label values in the family's declared label order.
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub name: String,
    pub help: String,
    pub kind: MetricType,
    pub label_names: Vec<String>,
    /// Ordered by label values.
    pub samples: Vec<SeriesSnapshot>,
}

impl FamilySnapshot {
    /// Find the series whose labels match every given `(name, value)` pair.
    ///
    /// Unlisted labels are treated as wildcards, so this may match several
    /// series; the first in label order is returned.
    pub fn find(&self, labels: &[(&str, &str)]) -> Option<&SeriesSnapshot> {
        self.samples.iter().find(|series| self.matches(series, labels))
    }

    fn matches(&self, series: &SeriesSnapshot, labels: &[(&str, &str)]) -> bool {
        labels.iter().all(|(name, value)| {
            self.label_names
                .iter()
                .position(|n| n == name)
                .map(|idx| series.label_values[idx] == *value)
                .unwrap_or(false)
        })
    }
}

/// A copy of every family in the registry, ordered by family name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub families: Vec<FamilySnapshot>,
}

impl RegistrySnapshot {
    pub fn family(&self, name: &str) -> Option<&FamilySnapshot> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Sum of a counter or gauge family across the series matching `labels`.
    ///
    /// Returns `0.0` for unknown families and for histograms.
    pub fn sum(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.family(name)
            .map(|family| {
                family
                    .samples
                    .iter()
                    .filter(|series| family.matches(series, labels))
                    .map(|series| match series.value {
                        SampleValue::Counter(v) | SampleValue::Gauge(v) => v,
                        SampleValue::Histogram { .. } => 0.0,
                    })
                    .sum::<f64>()
            })
            .unwrap_or(0.0)
    }

    /// `(sum, count)` of a histogram family across every series.
    pub fn histogram_totals(&self, name: &str) -> (f64, u64) {
        self.family(name)
            .map(|family| {
                family
                    .samples
                    .iter()
                    .fold((0.0, 0), |(sum, count), series| match &series.value {
                        SampleValue::Histogram { sum: s, count: c, .. } => (sum + s, count + c),
                        _ => (sum, count),
                    })
            })
            .unwrap_or((0.0, 0))
    }
}
