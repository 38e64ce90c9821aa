//! Explicit session state and the render pass.
//!
//! Every operator action is an [`Interaction`]. [`handle`] takes the current
//! [`SessionState`] by value, applies the interaction, recomputes everything
//! the page shows and returns the new state alongside the result of the
//! pass. Nothing is kept between passes except the state and the dataset
//! cache the caller owns.

use crate::chart::{raw_chart, scaled_chart, ChartSpec};
use crate::export::{export_flagged, ExportFile, EXPORT_FILE_NAME};
use crate::selection::{MetricSelection, RawChoice};
use sensor_core::error::DashboardError;
use sensor_core::reading::Metric;
use sensor_core::timestamp::format_instant;
use sensor_core::window::{StepSize, Window, WindowState};
use sensor_data::annotate::{annotate, AnomalyRatio};
use sensor_data::filter::filter;
use sensor_source::cache::DatasetCache;
use sensor_source::{LoadOptions, RowSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything the operator has chosen so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub window: WindowState,
    pub selection: MetricSelection,
    /// Contents of the manual start field.
    pub start_text: String,
    /// Contents of the manual end field.
    pub end_text: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(WindowState::default(), MetricSelection::default())
    }
}

impl SessionState {
    pub fn new(window: WindowState, selection: MetricSelection) -> Self {
        let mut state = Self {
            window,
            selection,
            start_text: String::new(),
            end_text: String::new(),
        };
        state.sync_text();
        state
    }

    fn sync_text(&mut self) {
        self.start_text = format_instant(&self.window.window.start);
        self.end_text = format_instant(&self.window.window.end);
    }

    /// Establish the session the first time; later calls keep the existing one.
    pub fn initialize<'a>(
        slot: &'a mut Option<SessionState>,
        defaults: &SessionState,
    ) -> &'a mut SessionState {
        slot.get_or_insert_with(|| defaults.clone())
    }

    fn apply(&mut self, interaction: Interaction) -> Result<(), DashboardError> {
        match interaction {
            Interaction::Refresh => {}
            Interaction::Retreat => {
                self.window.retreat()?;
                self.sync_text();
            }
            Interaction::Advance => {
                self.window.advance()?;
                self.sync_text();
            }
            Interaction::SetManualText { start, end } => {
                self.start_text = start;
                self.end_text = end;
            }
            Interaction::Submit => {
                self.window.set_manual(&self.start_text, &self.end_text)?;
            }
            Interaction::SetStep(step) => self.window.step = step,
            Interaction::SelectScaled(metrics) => self.selection.set_scaled(metrics),
            Interaction::SelectRaw(choice) => self.selection.raw = choice,
            Interaction::ToggleAnomalies(on) => self.selection.highlight_anomalies = on,
        }
        Ok(())
    }
}

/// One operator action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Re-render without changing anything.
    Refresh,
    /// Previous step.
    Retreat,
    /// Next step.
    Advance,
    /// Type into the manual fields without applying them.
    SetManualText { start: String, end: String },
    /// Apply the manual fields, "YYYY-MM-DD HH:MM:SS" each.
    Submit,
    SetStep(StepSize),
    SelectScaled(Vec<Metric>),
    SelectRaw(RawChoice),
    ToggleAnomalies(bool),
}

/// Where the datasets of a session come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub primary: RowSource,
    pub anomalies: Option<RowSource>,
    pub options: LoadOptions,
    pub export_file_name: String,
}

impl DataSources {
    pub fn new(primary: RowSource, anomalies: Option<RowSource>) -> Self {
        Self {
            primary,
            anomalies,
            options: LoadOptions::default(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message shown to the operator for this pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{}] {}", tag, self.message)
    }
}

/// Everything one pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPass {
    pub window: Window,
    pub step_minutes: u32,
    pub notices: Vec<Notice>,
    /// Rows inside the window.
    pub rows_in_window: usize,
    /// Rows in the whole dataset.
    pub rows_total: usize,
    pub scaled_chart: Option<ChartSpec>,
    pub raw_chart: Option<ChartSpec>,
    pub window_ratio: Option<AnomalyRatio>,
    pub overall_ratio: Option<AnomalyRatio>,
    pub export_visible: bool,
    #[serde(skip)]
    pub export: Option<ExportFile>,
}

/// Apply `interaction` to `state` and recompute the page.
///
/// A malformed manual window, or a step that would leave the representable
/// date range, aborts the pass and hands back `state` unchanged. A row that cannot be compared against the window aborts the
/// pass after the interaction was applied. A primary dataset that fails to
/// load degrades the pass to an empty dataset with an error notice.
pub fn handle(
    state: SessionState,
    interaction: Interaction,
    cache: &DatasetCache,
    sources: &DataSources,
) -> (SessionState, Result<RenderPass, DashboardError>) {
    let mut next = state.clone();
    if let Err(e) = next.apply(interaction) {
        log::error!("session: {}", e);
        return (state, Err(e));
    }
    let result = render(&next, cache, sources);
    (next, result)
}

/// Recompute the page for `state` without changing it.
pub fn render(
    state: &SessionState,
    cache: &DatasetCache,
    sources: &DataSources,
) -> Result<RenderPass, DashboardError> {
    let mut notices = Vec::new();
    let window = state.window.window;
    let selection = &state.selection;

    let (dataset, load_error) = cache.primary_or_empty(&sources.primary, &sources.options);
    if let Some(e) = load_error {
        notices.push(Notice::new(NoticeLevel::Error, e.to_string()));
    }

    let view = filter(&dataset, &window).map_err(|e| {
        log::error!("session: {}", e);
        e
    })?;

    let anomalies = match (&sources.anomalies, selection.highlight_anomalies) {
        (Some(source), true) => {
            let (anomalies, error) = cache.anomalies_or_none(source, &sources.options);
            if let Some(e) = error {
                notices.push(Notice::new(NoticeLevel::Warning, e.to_string()));
            }
            anomalies
        }
        (None, true) => {
            notices.push(Notice::new(
                NoticeLevel::Warning,
                "No anomaly dataset configured; anomaly highlighting is unavailable",
            ));
            None
        }
        (_, false) => None,
    };

    let annotated = match anomalies.as_deref() {
        Some(secondary) => match annotate(&dataset, secondary) {
            Ok(annotated) => Some(annotated),
            Err(e) => {
                notices.push(Notice::new(NoticeLevel::Error, e.to_string()));
                None
            }
        },
        None => None,
    };

    let window_ratio = annotated.as_ref().map(|a| a.view_ratio(&view));
    let overall_ratio = annotated.as_ref().map(|a| a.overall_ratio());
    if let Some(ratio) = &window_ratio {
        notices.push(Notice::new(
            NoticeLevel::Info,
            format!("Anomalies in window: {}", ratio),
        ));
    }

    let scaled = scaled_chart(&view, selection, annotated.as_ref());
    let raw = raw_chart(&view, selection, annotated.as_ref());

    let export_visible = selection.export_visible(annotated.is_some());
    let export = match (&annotated, export_visible) {
        (Some(annotated), true) => Some(export_flagged(
            &view,
            annotated,
            &sources.options.time_column,
            &sources.export_file_name,
        )?),
        _ => None,
    };

    if let Some(ratio) = &overall_ratio {
        notices.push(Notice::new(
            NoticeLevel::Info,
            format!("Anomalies overall: {}", ratio),
        ));
    }
    if scaled.is_some() || raw.is_some() {
        notices.push(Notice::new(
            NoticeLevel::Success,
            "Charts generated. Hover over a point for its readings",
        ));
    }

    log::info!(
        "session: rendered {} ({} of {} rows, step {}m)",
        window,
        view.len(),
        dataset.len(),
        state.window.step.minutes()
    );
    Ok(RenderPass {
        window,
        step_minutes: state.window.step.minutes(),
        notices,
        rows_in_window: view.len(),
        rows_total: dataset.len(),
        scaled_chart: scaled,
        raw_chart: raw,
        window_ratio,
        overall_ratio,
        export_visible,
        export,
    })
}
