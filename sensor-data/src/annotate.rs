//! Attaching anomaly flags to readings and computing anomaly ratios.
//!
//! The anomaly dataset carries no key column: row *i* of it annotates row
//! *i* of the primary dataset. Because nothing else ties the two together,
//! the row counts must match exactly.

use crate::filter::FilteredView;
use sensor_core::error::AlignmentError;
use sensor_core::reading::{AnomalyAnnotation, AnomalyDataset, Dataset};
use serde::Serialize;
use std::fmt;

/// A primary dataset joined positionally with its anomaly annotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotatedDataset<'a> {
    pub primary: &'a Dataset,
    pub annotations: &'a [AnomalyAnnotation],
}

/// Join `secondary` onto `primary` by row position.
pub fn annotate<'a>(
    primary: &'a Dataset,
    secondary: &'a AnomalyDataset,
) -> Result<AnnotatedDataset<'a>, AlignmentError> {
    if primary.len() != secondary.len() {
        log::error!(
            "annotate: {} has {} rows, {} has {}",
            secondary.source_name,
            secondary.len(),
            primary.source_name,
            primary.len()
        );
        return Err(AlignmentError {
            primary_name: primary.source_name.clone(),
            primary_rows: primary.len(),
            secondary_name: secondary.source_name.clone(),
            secondary_rows: secondary.len(),
        });
    }
    Ok(AnnotatedDataset {
        primary,
        annotations: &secondary.annotations,
    })
}

impl<'a> AnnotatedDataset<'a> {
    /// Annotation for a row position of the primary dataset.
    pub fn annotation(&self, row: usize) -> Option<&'a AnomalyAnnotation> {
        self.annotations.get(row)
    }

    pub fn is_flagged(&self, row: usize) -> bool {
        self.annotation(row).is_some_and(|a| a.res_spike_anomaly)
    }

    /// The rows of `view` flagged as anomalies.
    pub fn flagged(&self, view: &FilteredView<'a>) -> FilteredView<'a> {
        view.subset(
            view.rows
                .iter()
                .copied()
                .filter(|&row| self.is_flagged(row))
                .collect(),
        )
    }

    /// Anomaly ratio over the rows of `view`.
    pub fn view_ratio(&self, view: &FilteredView<'_>) -> AnomalyRatio {
        ratio(view.rows.iter().map(|&row| self.is_flagged(row)))
    }

    /// Anomaly ratio over the whole dataset.
    pub fn overall_ratio(&self) -> AnomalyRatio {
        ratio(self.annotations.iter().map(|a| a.res_spike_anomaly))
    }
}

/// Count of flagged rows out of a total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRatio {
    pub count: u64,
    pub total: u64,
    pub percent: f64,
}

/// `percent = 100 * count / total`, or 0 when there are no rows.
pub fn ratio<I>(flags: I) -> AnomalyRatio
where
    I: IntoIterator<Item = bool>,
{
    let (count, total) = flags
        .into_iter()
        .fold((0u64, 0u64), |(count, total), flag| {
            (count + u64::from(flag), total + 1)
        });
    let percent = if total > 0 {
        100.0 * count as f64 / total as f64
    } else {
        0.0
    };
    AnomalyRatio {
        count,
        total,
        percent,
    }
}

impl fmt::Display for AnomalyRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} rows ({:.2}%)", self.count, self.total, self.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter;
    use crate::fixtures::{anomalies, at, bucketed};
    use sensor_core::window::Window;

    #[test]
    fn test_ratio_empty() {
        let r = ratio(std::iter::empty::<bool>());
        assert_eq!((r.count, r.total, r.percent), (0, 0, 0.0));
    }

    #[test]
    fn test_ratio_exact() {
        let flags = (0..40).map(|i| i < 3);
        let r = ratio(flags);
        assert_eq!((r.count, r.total, r.percent), (3, 40, 7.5));
        assert_eq!(r.to_string(), "3 / 40 rows (7.50%)");
    }

    #[test]
    fn test_annotate_positional() {
        let ds = bucketed();
        let an = anomalies(100, &[5, 42]);
        let annotated = annotate(&ds, &an).unwrap();
        for row in 0..100 {
            assert_eq!(annotated.is_flagged(row), row == 5 || row == 42, "row {}", row);
        }
        assert_eq!(annotated.annotation(42).unwrap().res_spike_anomaly_score, 0.9);
        assert!(annotated.annotation(100).is_none());
        let overall = annotated.overall_ratio();
        assert_eq!((overall.count, overall.total, overall.percent), (2, 100, 2.0));
    }

    #[test]
    fn test_view_ratio_and_flagged_subset() {
        let ds = bucketed();
        let an = anomalies(100, &[5, 42]);
        let annotated = annotate(&ds, &an).unwrap();
        let view = filter(&ds, &Window::new(at(2, 10, 0), at(2, 30, 0))).unwrap();
        let r = annotated.view_ratio(&view);
        assert_eq!((r.count, r.total, r.percent), (1, 50, 2.0));
        let flagged = annotated.flagged(&view);
        assert_eq!(flagged.rows, vec![42]);
        assert_eq!(flagged.window, view.window);
    }

    #[test]
    fn test_annotate_rejects_mismatched_lengths() {
        let ds = bucketed();
        let short = anomalies(99, &[]);
        let err = annotate(&ds, &short).unwrap_err();
        assert_eq!(err.primary_rows, 100);
        assert_eq!(err.secondary_rows, 99);
        assert_eq!(err.secondary_name, "anomalies.csv");
    }
}
