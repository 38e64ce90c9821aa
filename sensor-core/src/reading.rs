use crate::timestamp::format_instant;
use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column holding the 0/1 anomaly flag in the anomaly dataset.
pub const ANOMALY_FLAG_COLUMN: &str = "res_spike_anomaly";

/// Column holding the anomaly score in the anomaly dataset.
pub const ANOMALY_SCORE_COLUMN: &str = "res_spike_anomaly_score";

/// One of the four sensor channels.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Current,
    Voltage,
    Resistance,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Current,
        Metric::Voltage,
        Metric::Resistance,
        Metric::Temperature,
    ];

    /// Column name of the raw channel.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Current => "current",
            Metric::Voltage => "voltage",
            Metric::Resistance => "resistance",
            Metric::Temperature => "temperature",
        }
    }

    /// Column name of the standardized companion channel.
    pub fn scaled_column(&self) -> &'static str {
        match self {
            Metric::Current => "current_scaled",
            Metric::Voltage => "voltage_scaled",
            Metric::Resistance => "resistance_scaled",
            Metric::Temperature => "temperature_scaled",
        }
    }

    /// Capitalized label used in chart titles and legends.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Current => "Current",
            Metric::Voltage => "Voltage",
            Metric::Resistance => "Resistance",
            Metric::Temperature => "Temperature",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Metric::Current),
            "voltage" => Ok(Metric::Voltage),
            "resistance" => Ok(Metric::Resistance),
            "temperature" => Ok(Metric::Temperature),
            other => Err(format!(
                "unknown metric '{}', expected one of current, voltage, resistance, temperature",
                other
            )),
        }
    }
}

/// The `record Time` of a row: parsed, or the raw text kept by a lenient load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTime {
    At(NaiveDateTime),
    Unparsed(String),
}

impl RecordTime {
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            RecordTime::At(instant) => Some(*instant),
            RecordTime::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for RecordTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordTime::At(instant) => f.write_str(&format_instant(instant)),
            RecordTime::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// A single sensor sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: RecordTime,
    pub current: f64,
    pub voltage: f64,
    pub resistance: f64,
    pub temperature: f64,
    pub current_scaled: f64,
    pub voltage_scaled: f64,
    pub resistance_scaled: f64,
    pub temperature_scaled: f64,
}

impl Reading {
    /// Raw value of a channel.
    pub fn raw(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Current => self.current,
            Metric::Voltage => self.voltage,
            Metric::Resistance => self.resistance,
            Metric::Temperature => self.temperature,
        }
    }

    /// Standardized value of a channel.
    pub fn scaled(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Current => self.current_scaled,
            Metric::Voltage => self.voltage_scaled,
            Metric::Resistance => self.resistance_scaled,
            Metric::Temperature => self.temperature_scaled,
        }
    }
}

/// A loaded primary dataset.
///
/// `records` keeps every original CSV row, parallel to `readings`, so that
/// exports can reproduce all source columns in their source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub source_name: String,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
    pub readings: Vec<Reading>,
}

impl Dataset {
    /// An empty dataset standing in for a source that failed to load.
    pub fn empty(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Anomaly flag and score for one row of the primary dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyAnnotation {
    pub res_spike_anomaly: bool,
    pub res_spike_anomaly_score: f64,
}

/// A loaded anomaly dataset, aligned to the primary dataset by row position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnomalyDataset {
    pub source_name: String,
    pub annotations: Vec<AnomalyAnnotation>,
}

impl AnomalyDataset {
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
