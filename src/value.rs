//! Values handed to the sampler.
//!
//! A [`RandomValue`] is the only thing that ever crosses from a provider to
//! its caller. Clamping happens here, once, so callers never re-validate.

use std::fmt;

use crate::util;

/// A single control value in `[0, 1]`, tagged with its origin.
///
/// Immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomValue {
    value: f64,
    source: String,
    timestamp_ms: u64,
}

impl RandomValue {
    /// Creates a value stamped with the current time.
    ///
    /// `raw` is clamped into `[0, 1]`; `NaN` becomes `0.0`.
    #[must_use]
    pub fn new(raw: f64, source: &str) -> Self {
        Self::with_timestamp(raw, source, util::now_millis())
    }

    /// Creates a value with an explicit epoch-millisecond timestamp.
    #[must_use]
    pub fn with_timestamp(raw: f64, source: &str, timestamp_ms: u64) -> Self {
        Self {
            value: clamp_unit(raw),
            source: source.to_owned(),
            timestamp_ms,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Name of the backend that produced this value.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }
}

impl From<RandomValue> for f64 {
    fn from(value: RandomValue) -> Self {
        value.value
    }
}

impl fmt::Display for RandomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} ({})", self.value, self.source)
    }
}

/// Forces `raw` to the nearest boundary of `[0, 1]`.
///
/// Out-of-range values are clamped, never resampled.
#[must_use]
pub fn clamp_unit(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}
