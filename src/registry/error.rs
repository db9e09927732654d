use super::MetricType;
use thiserror::Error;

/// Failures raised by the [`Registry`](super::Registry).
///
/// All of these indicate a programming error in the caller (a family used
/// with the wrong type, a typo in a label name, ...). They are surfaced
/// eagerly at registration time; the business recorder logs and drops any
/// that happen at request time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("metric family `{name}` is already registered with a different schema")]
    DuplicateFamily { name: String },

    #[error("metric family `{name}` is not registered")]
    UnknownFamily { name: String },

    #[error("metric family `{name}` is a {actual}, not a {expected}")]
    WrongType {
        name: String,
        expected: MetricType,
        actual: MetricType,
    },

    #[error("label mismatch on `{name}`: {reason}")]
    LabelMismatch { name: String, reason: String },

    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidValue {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid metric or label name `{0}`")]
    InvalidName(String),

    #[error("metric family `{name}` reached its limit of {limit} series")]
    CardinalityExceeded { name: String, limit: usize },
}
