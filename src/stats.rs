//! Distribution summaries for sanity-checking a provider.

use std::fmt;

/// Aggregate statistics over a batch of values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarises `values`, or `None` when empty.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (squares / (count - 1) as f64).sqrt()
        } else {
            0.0
        };
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} mean={:.4} std_dev={:.4} min={:.6} max={:.6}",
            self.count, self.mean, self.std_dev, self.min, self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_has_no_summary() {
        assert!(Summary::from_values(&[]).is_none());
    }

    #[test]
    fn computes_sample_statistics() {
        let summary = Summary::from_values(&[0.0, 0.25, 0.5, 0.75, 1.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_relative_eq!(summary.mean, 0.5);
        assert_relative_eq!(summary.std_dev, 0.395_284_707_521_047_2, epsilon = 1e-12);
        assert_relative_eq!(summary.min, 0.0);
        assert_relative_eq!(summary.max, 1.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let summary = Summary::from_values(&[0.3]).unwrap();
        assert_relative_eq!(summary.std_dev, 0.0);
    }
}
