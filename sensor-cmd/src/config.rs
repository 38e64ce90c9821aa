//! Dashboard configuration.
//!
//! Settings come from an optional JSON file, then command-line flags on top.
//! Any field missing from the file keeps its default.

use anyhow::Context;
use clap::{Args, ValueEnum};
use sensor_core::reading::Metric;
use sensor_core::timestamp::{format_instant, parse_manual, RECORD_TIME_COLUMN};
use sensor_core::window::{StepSize, Window, WindowState};
use sensor_source::{LoadOptions, RowSource, TimestampPolicy};
use sensor_view::export::EXPORT_FILE_NAME;
use sensor_view::selection::{MetricSelection, RawChoice};
use sensor_view::session::{DataSources, SessionState};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Standardized readings CSV.
    pub primary: PathBuf,
    /// Anomaly results CSV, matched to the readings by row position.
    pub anomalies: Option<PathBuf>,
    pub delimiter: char,
    pub time_column: String,
    pub timestamp_policy: TimestampPolicy,
    pub window_start: String,
    pub window_end: String,
    pub step: StepSize,
    pub scaled: Vec<Metric>,
    pub raw: RawChoice,
    pub highlight_anomalies: bool,
    pub export_file_name: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let window = Window::default();
        Self {
            primary: PathBuf::from("data/processed/sensorID_28_standardized.csv"),
            anomalies: Some(PathBuf::from("results/anomaly_results.csv")),
            delimiter: ',',
            time_column: RECORD_TIME_COLUMN.to_string(),
            timestamp_policy: TimestampPolicy::Strict,
            window_start: format_instant(&window.start),
            window_end: format_instant(&window.end),
            step: StepSize::default(),
            scaled: MetricSelection::default().scaled().to_vec(),
            raw: RawChoice::None,
            highlight_anomalies: false,
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The config file named by `args` (or the defaults) with the flags applied.
    pub fn resolve(args: &SourceArgs, view: Option<&ViewArgs>) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_source_args(args);
        if let Some(view) = view {
            config.apply_view_args(view)?;
        }
        log::debug!("config: {:?}", config);
        Ok(config)
    }

    pub fn apply_source_args(&mut self, args: &SourceArgs) {
        if let Some(primary) = &args.primary {
            self.primary = primary.clone();
        }
        if let Some(anomalies) = &args.anomalies {
            self.anomalies = Some(anomalies.clone());
        }
        if args.no_anomalies {
            self.anomalies = None;
        }
        if let Some(delimiter) = args.delimiter {
            self.delimiter = delimiter;
        }
        if let Some(column) = &args.time_column {
            self.time_column = column.clone();
        }
        if args.lenient {
            self.timestamp_policy = TimestampPolicy::Lenient;
        }
    }

    pub fn apply_view_args(&mut self, view: &ViewArgs) -> anyhow::Result<()> {
        if let Some(start) = &view.start {
            self.window_start = start.clone();
        }
        if let Some(end) = &view.end {
            self.window_end = end.clone();
        }
        if let Some(step) = view.step {
            self.step = step;
        }
        if let Some(scaled) = &view.scaled {
            self.scaled = parse_metric_list(scaled).map_err(anyhow::Error::msg)?;
        }
        if let Some(raw) = view.raw {
            self.raw = raw;
        }
        if view.highlight {
            self.highlight_anomalies = true;
        }
        Ok(())
    }

    pub fn load_options(&self) -> anyhow::Result<LoadOptions> {
        if !self.delimiter.is_ascii() {
            anyhow::bail!("Delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        Ok(LoadOptions {
            delimiter: self.delimiter as u8,
            time_column: self.time_column.clone(),
            timestamp_policy: self.timestamp_policy,
        })
    }

    pub fn data_sources(&self) -> anyhow::Result<DataSources> {
        Ok(DataSources {
            primary: RowSource::path(&self.primary),
            anomalies: self.anomalies.as_ref().map(|path| RowSource::path(path)),
            options: self.load_options()?,
            export_file_name: self.export_file_name.clone(),
        })
    }

    /// The session a fresh dashboard opens with.
    pub fn initial_state(&self) -> anyhow::Result<SessionState> {
        let window = Window::new(parse_manual(&self.window_start)?, parse_manual(&self.window_end)?);
        Ok(SessionState::new(
            WindowState {
                window,
                step: self.step,
            },
            MetricSelection::new(self.scaled.clone(), self.raw, self.highlight_anomalies),
        ))
    }
}

/// Comma separated metric names; `-`, `none` or nothing at all select no metric.
pub fn parse_metric_list(text: &str) -> Result<Vec<Metric>, String> {
    let text = text.trim();
    if text.is_empty() || text == "-" || text.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    text.split(',').map(str::parse).collect()
}

/// Where the data comes from and how it is read.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// JSON config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Standardized readings CSV (plain or gzip)
    #[arg(short, long)]
    pub primary: Option<PathBuf>,

    /// Anomaly results CSV, row-aligned with the readings
    #[arg(short, long, conflicts_with = "no_anomalies")]
    pub anomalies: Option<PathBuf>,

    /// Run without an anomaly dataset
    #[arg(long)]
    pub no_anomalies: bool,

    /// Field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Name of the timestamp column
    #[arg(long)]
    pub time_column: Option<String>,

    /// Keep rows whose timestamp cannot be parsed instead of failing the load
    #[arg(long)]
    pub lenient: bool,
}

/// Navigation applied after the initial window is set.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Prev,
    Next,
}

/// What the first render pass shows.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Window start, YYYY-MM-DD HH:MM:SS
    #[arg(long)]
    pub start: Option<String>,

    /// Window end, YYYY-MM-DD HH:MM:SS
    #[arg(long)]
    pub end: Option<String>,

    /// Navigation step in minutes (15, 30 or 60)
    #[arg(long)]
    pub step: Option<StepSize>,

    /// Scaled metrics, comma separated, or "-" for none
    #[arg(long, allow_hyphen_values = true)]
    pub scaled: Option<String>,

    /// Raw metric to plot, or "none"
    #[arg(long)]
    pub raw: Option<RawChoice>,

    /// Highlight resistance anomalies
    #[arg(long)]
    pub highlight: bool,

    /// Step the window back or forward, in order; may be repeated
    #[arg(long, value_enum)]
    pub nav: Vec<Nav>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.primary, PathBuf::from("data/processed/sensorID_28_standardized.csv"));
        assert_eq!(config.anomalies, Some(PathBuf::from("results/anomaly_results.csv")));
        assert_eq!(config.window_start, "2025-02-06 02:00:00");
        assert_eq!(config.window_end, "2025-02-06 02:50:00");
        assert_eq!(config.scaled, vec![Metric::Resistance, Metric::Temperature]);
        assert_eq!(config.export_file_name, "filtered_anomalies.csv");
        assert_eq!(config.initial_state().unwrap(), SessionState::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DashboardConfig::from_json(
            r#"{
                "primary": "readings.csv.gz",
                "anomalies": null,
                "step": 60,
                "scaled": ["current"],
                "raw": "resistance",
                "timestamp_policy": "lenient"
            }"#,
        )
        .unwrap();
        assert_eq!(config.primary, PathBuf::from("readings.csv.gz"));
        assert_eq!(config.anomalies, None);
        assert_eq!(config.step, StepSize::Minutes60);
        assert_eq!(config.scaled, vec![Metric::Current]);
        assert_eq!(config.raw, RawChoice::Metric(Metric::Resistance));
        assert_eq!(config.timestamp_policy, TimestampPolicy::Lenient);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.window_start, "2025-02-06 02:00:00");
    }

    #[test]
    fn test_bad_step_rejected() {
        assert!(DashboardConfig::from_json(r#"{"step": 45}"#).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = DashboardConfig::default();
        config.apply_source_args(&SourceArgs {
            primary: Some(PathBuf::from("other.csv")),
            no_anomalies: true,
            delimiter: Some(';'),
            lenient: true,
            ..SourceArgs::default()
        });
        config
            .apply_view_args(&ViewArgs {
                start: Some("2025-02-06 02:10:00".to_string()),
                end: Some("2025-02-06 02:30:00".to_string()),
                scaled: Some("-".to_string()),
                raw: Some(RawChoice::Metric(Metric::Voltage)),
                highlight: true,
                ..ViewArgs::default()
            })
            .unwrap();

        let sources = config.data_sources().unwrap();
        assert_eq!(sources.primary, RowSource::path("other.csv"));
        assert!(sources.anomalies.is_none());
        assert_eq!(sources.options.delimiter, b';');
        assert_eq!(sources.options.timestamp_policy, TimestampPolicy::Lenient);

        let state = config.initial_state().unwrap();
        assert_eq!(state.window.window.to_string(), "2025-02-06 02:10:00 ~ 2025-02-06 02:30:00");
        assert!(state.selection.scaled().is_empty());
        assert!(state.selection.highlight_anomalies);
    }

    #[test]
    fn test_bad_window_is_an_error() {
        let config = DashboardConfig {
            window_start: "2025-02-06T02:00".to_string(),
            ..DashboardConfig::default()
        };
        let err = config.initial_state().unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD HH:MM:SS"));
    }

    #[test]
    fn test_parse_metric_list() {
        assert_eq!(
            parse_metric_list("voltage, current").unwrap(),
            vec![Metric::Voltage, Metric::Current]
        );
        assert!(parse_metric_list("-").unwrap().is_empty());
        assert!(parse_metric_list("none").unwrap().is_empty());
        assert!(parse_metric_list("voltage,pressure").is_err());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = DashboardConfig {
            delimiter: '§',
            ..DashboardConfig::default()
        };
        assert!(config.load_options().is_err());
    }
}
