//! Selecting the rows that fall inside the current window.

use sensor_core::error::FilterError;
use sensor_core::reading::{Dataset, Reading, RecordTime};
use sensor_core::window::Window;

/// The rows of a dataset whose timestamp lies in a window, in dataset order.
///
/// Rows are referenced by position so that positionally aligned anomaly
/// annotations can be looked up for them.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    pub dataset: &'a Dataset,
    pub window: Window,
    pub rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(row position, reading)` pairs in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a Reading)> + '_ {
        let readings: &'a [Reading] = &self.dataset.readings;
        self.rows.iter().map(move |&row| (row, &readings[row]))
    }

    /// A view over a subset of this view's rows.
    pub fn subset(&self, rows: Vec<usize>) -> FilteredView<'a> {
        FilteredView {
            dataset: self.dataset,
            window: self.window,
            rows,
        }
    }
}

/// Select every reading with `window.start <= timestamp <= window.end`.
///
/// An inverted window selects nothing. A row whose timestamp was never parsed
/// fails the whole call.
pub fn filter<'a>(dataset: &'a Dataset, window: &Window) -> Result<FilteredView<'a>, FilterError> {
    let mut rows = Vec::new();
    for (row, reading) in dataset.readings.iter().enumerate() {
        match &reading.timestamp {
            RecordTime::At(instant) => {
                if window.contains(instant) {
                    rows.push(row);
                }
            }
            RecordTime::Unparsed(raw) => {
                return Err(FilterError::UnparsedTimestamp {
                    source_name: dataset.source_name.clone(),
                    row,
                    raw: raw.clone(),
                });
            }
        }
    }
    log::debug!(
        "filter: {} of {} rows of {} in {}",
        rows.len(),
        dataset.len(),
        dataset.source_name,
        window
    );
    Ok(FilteredView {
        dataset,
        window: *window,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, bucketed, dataset_from_times};

    #[test]
    fn test_filter_is_inclusive_on_both_ends() {
        let ds = bucketed();
        let view = filter(&ds, &Window::new(at(2, 10, 0), at(2, 30, 0))).unwrap();
        assert_eq!(view.len(), 50);
        assert_eq!(view.rows.first(), Some(&20));
        assert_eq!(view.rows.last(), Some(&69));
        for (row, reading) in ds.readings.iter().enumerate() {
            let t = reading.timestamp.instant().unwrap();
            let inside = at(2, 10, 0) <= t && t <= at(2, 30, 0);
            assert_eq!(view.rows.contains(&row), inside, "row {}", row);
        }
    }

    #[test]
    fn test_filter_single_instant_window() {
        let ds = bucketed();
        let view = filter(&ds, &Window::new(at(2, 45, 0), at(2, 45, 0))).unwrap();
        assert_eq!(view.rows, (90..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_filter_inverted_window_is_empty() {
        let ds = bucketed();
        let view = filter(&ds, &Window::new(at(2, 30, 0), at(2, 10, 0))).unwrap();
        assert!(view.is_empty());
    }

    #[test]
    fn test_filter_preserves_unsorted_order() {
        let ds = dataset_from_times(vec![
            RecordTime::At(at(2, 20, 0)),
            RecordTime::At(at(1, 0, 0)),
            RecordTime::At(at(2, 10, 0)),
            RecordTime::At(at(2, 20, 0)),
        ]);
        let view = filter(&ds, &Window::new(at(2, 0, 0), at(2, 30, 0))).unwrap();
        assert_eq!(view.rows, vec![0, 2, 3]);
        let values: Vec<f64> = view.iter().map(|(_, r)| r.current).collect();
        assert_eq!(values, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_filter_fails_on_unparsed_timestamp() {
        let ds = dataset_from_times(vec![
            RecordTime::At(at(2, 0, 0)),
            RecordTime::Unparsed("soon".to_string()),
        ]);
        let err = filter(&ds, &Window::new(at(0, 0, 0), at(1, 0, 0))).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnparsedTimestamp {
                source_name: "fixture.csv".to_string(),
                row: 1,
                raw: "soon".to_string(),
            }
        );
    }

    #[test]
    fn test_filter_empty_dataset() {
        let ds = Dataset::empty("none.csv");
        let view = filter(&ds, &Window::default()).unwrap();
        assert!(view.is_empty());
    }
}
