//! Metric selection and the rules that follow from it.

use sensor_core::reading::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The single raw metric to plot, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RawChoice {
    #[default]
    None,
    Metric(Metric),
}

impl FromStr for RawChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(RawChoice::None);
        }
        s.parse::<Metric>().map(RawChoice::Metric)
    }
}

impl TryFrom<String> for RawChoice {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RawChoice> for String {
    fn from(choice: RawChoice) -> String {
        choice.to_string()
    }
}

impl fmt::Display for RawChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawChoice::None => f.write_str("none"),
            RawChoice::Metric(metric) => write!(f, "{}", metric),
        }
    }
}

/// What the operator chose to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSelection {
    /// Metrics for the scaled chart, in selection order, without repeats.
    scaled: Vec<Metric>,
    pub raw: RawChoice,
    pub highlight_anomalies: bool,
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self {
            scaled: vec![Metric::Resistance, Metric::Temperature],
            raw: RawChoice::None,
            highlight_anomalies: false,
        }
    }
}

impl MetricSelection {
    pub fn new(scaled: Vec<Metric>, raw: RawChoice, highlight_anomalies: bool) -> Self {
        let mut selection = Self {
            scaled: Vec::new(),
            raw,
            highlight_anomalies,
        };
        selection.set_scaled(scaled);
        selection
    }

    pub fn scaled(&self) -> &[Metric] {
        &self.scaled
    }

    /// Replace the scaled metrics, dropping repeats.
    pub fn set_scaled(&mut self, metrics: Vec<Metric>) {
        self.scaled.clear();
        for metric in metrics {
            if !self.scaled.contains(&metric) {
                self.scaled.push(metric);
            }
        }
    }

    pub fn scaled_chart_active(&self) -> bool {
        !self.scaled.is_empty()
    }

    pub fn raw_chart_active(&self) -> bool {
        self.raw != RawChoice::None
    }

    pub fn any_chart_active(&self) -> bool {
        self.scaled_chart_active() || self.raw_chart_active()
    }

    /// Anomalies are drawn on the scaled chart only when it plots resistance.
    pub fn overlay_on_scaled(&self, annotations_loaded: bool) -> bool {
        self.highlight_anomalies && annotations_loaded && self.scaled.contains(&Metric::Resistance)
    }

    /// Anomalies are drawn on the raw chart only when it plots resistance.
    pub fn overlay_on_raw(&self, annotations_loaded: bool) -> bool {
        self.highlight_anomalies
            && annotations_loaded
            && self.raw == RawChoice::Metric(Metric::Resistance)
    }

    /// The export control needs an active chart, the anomaly toggle, and
    /// annotations to export.
    pub fn export_visible(&self, annotations_loaded: bool) -> bool {
        self.any_chart_active() && self.highlight_anomalies && annotations_loaded
    }
}
