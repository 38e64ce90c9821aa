//! Chart descriptions for the charting front end.
//!
//! All structs derive `Serialize` so a chart can be handed to the renderer as
//! JSON. A chart is a list of traces; each trace is a sequence of points with
//! hover text. Anomaly overlays are separate marker-only traces drawn on top.

use crate::hover::{anomaly_hover_text, hover_text};
use crate::selection::{MetricSelection, RawChoice};
use sensor_core::reading::{Metric, Reading};
use sensor_data::annotate::AnnotatedDataset;
use sensor_data::filter::FilteredView;
use serde::Serialize;

const POINT_MARKER_SIZE: u32 = 4;
const ANOMALY_MARKER_SIZE: u32 = 8;
const ANOMALY_COLOR: &str = "red";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    LinesMarkers,
    Markers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: String,
    pub y: f64,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub mode: TraceMode,
    pub marker: Marker,
    /// True for anomaly overlays.
    pub highlight: bool,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    fn new(title: String, y_title: &str) -> Self {
        Self {
            title,
            x_title: "Time".to_string(),
            y_title: y_title.to_string(),
            traces: Vec::new(),
        }
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }
}

fn series_trace<F>(name: String, view: &FilteredView<'_>, value: F) -> Trace
where
    F: Fn(&Reading) -> f64,
{
    Trace {
        name,
        mode: TraceMode::LinesMarkers,
        marker: Marker {
            size: POINT_MARKER_SIZE,
            color: None,
        },
        highlight: false,
        points: view
            .iter()
            .map(|(_, reading)| Point {
                x: reading.timestamp.to_string(),
                y: value(reading),
                hover: hover_text(reading),
            })
            .collect(),
    }
}

fn anomaly_trace<F>(
    name: &str,
    view: &FilteredView<'_>,
    annotated: &AnnotatedDataset<'_>,
    value: F,
) -> Trace
where
    F: Fn(&Reading) -> f64,
{
    let points = view
        .iter()
        .filter_map(|(row, reading)| {
            let annotation = annotated.annotation(row)?;
            annotation.res_spike_anomaly.then(|| Point {
                x: reading.timestamp.to_string(),
                y: value(reading),
                hover: anomaly_hover_text(reading, annotation),
            })
        })
        .collect();
    Trace {
        name: name.to_string(),
        mode: TraceMode::Markers,
        marker: Marker {
            size: ANOMALY_MARKER_SIZE,
            color: Some(ANOMALY_COLOR),
        },
        highlight: true,
        points,
    }
}

/// The scaled-metrics chart, or `None` when no scaled metric is selected.
///
/// `annotated` is only consulted when the selection asks for the overlay.
pub fn scaled_chart(
    view: &FilteredView<'_>,
    selection: &MetricSelection,
    annotated: Option<&AnnotatedDataset<'_>>,
) -> Option<ChartSpec> {
    if !selection.scaled_chart_active() {
        return None;
    }
    let mut chart = ChartSpec::new("Scaled Metrics Trend".to_string(), "Scaled Value");
    for &metric in selection.scaled() {
        chart.traces.push(series_trace(
            format!("{} (scaled)", metric.label()),
            view,
            |r| r.scaled(metric),
        ));
    }
    if let Some(annotated) = annotated.filter(|_| selection.overlay_on_scaled(true)) {
        chart.traces.push(anomaly_trace(
            "Resistance Anomaly (scaled)",
            view,
            annotated,
            |r| r.resistance_scaled,
        ));
    }
    Some(chart)
}

/// The raw-metric chart, or `None` when the raw choice is `none`.
pub fn raw_chart(
    view: &FilteredView<'_>,
    selection: &MetricSelection,
    annotated: Option<&AnnotatedDataset<'_>>,
) -> Option<ChartSpec> {
    let metric: Metric = match selection.raw {
        RawChoice::None => return None,
        RawChoice::Metric(metric) => metric,
    };
    let mut chart = ChartSpec::new(format!("Raw Metric Trend: {}", metric.label()), "Raw Value");
    chart.traces.push(series_trace(
        format!("{} (raw)", metric.label()),
        view,
        |r| r.raw(metric),
    ));
    if let Some(annotated) = annotated.filter(|_| selection.overlay_on_raw(true)) {
        chart.traces.push(anomaly_trace(
            "Resistance Anomaly (raw)",
            view,
            annotated,
            |r| r.resistance,
        ));
    }
    Some(chart)
}
