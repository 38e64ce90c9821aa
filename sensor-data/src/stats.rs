//! Column statistics for the standardized channels.
//!
//! After standardization every `*_scaled` column should have a mean near 0
//! and a standard deviation near 1; these helpers report both, plus whether
//! any value strays beyond a z-score threshold.

use sensor_core::reading::{Dataset, Metric, Reading};
use serde::Serialize;
use std::fmt;

/// Default z-score beyond which a standardized value counts as an outlier.
pub const OUTLIER_THRESHOLD: f64 = 3.0;

/// Mean and sample standard deviation of one scaled column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub metric: Metric,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

impl fmt::Display for ColumnSummary {
    // Absolute values so that rounding noise never prints as -0.0000.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or("n/a".to_string(), |v| format!("{:.4}", v.abs()));
        write!(
            f,
            "{} mean: {}, std: {}",
            self.metric.scaled_column(),
            show(self.mean),
            show(self.std_dev)
        )
    }
}

/// Mean of the values, `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Summaries of the four scaled columns, in channel order.
pub fn summarize(readings: &[Reading]) -> Vec<ColumnSummary> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = readings.iter().map(|r| r.scaled(metric)).collect();
            ColumnSummary {
                metric,
                count: values.len(),
                mean: mean(&values),
                std_dev: sample_std_dev(&values),
            }
        })
        .collect()
}

/// Whether any scaled value of `metric` has an absolute value above `threshold`.
pub fn has_outlier(dataset: &Dataset, metric: Metric, threshold: f64) -> bool {
    dataset
        .readings
        .iter()
        .any(|r| r.scaled(metric).abs() > threshold)
}
