use sensor_core::reading::Metric;
use sensor_core::window::StepSize;
use sensor_source::cache::DatasetCache;
use sensor_source::RowSource;
use sensor_view::selection::RawChoice;
use sensor_view::session::{handle, DataSources, Interaction, SessionState};

const HEADER: &str = "record Time,current,voltage,resistance,temperature,current_scaled,voltage_scaled,resistance_scaled,temperature_scaled";

/// 100 rows, ten per five-minute bucket from 02:00:00 to 02:45:00.
fn readings_csv() -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for row in 0..100 {
        let minute = (row / 10) * 5;
        csv.push_str(&format!(
            "2025-02-06 02:{:02}:00,{}.0,220.0,0.0{},35.0,0.1,0.2,0.3,0.4\n",
            minute,
            row,
            100 + row
        ));
    }
    csv
}

/// Rows 5 and 42 flagged.
fn anomalies_csv() -> String {
    let mut csv = String::from("res_spike_anomaly,res_spike_anomaly_score\n");
    for row in 0..100 {
        if row == 5 || row == 42 {
            csv.push_str("1,0.93\n");
        } else {
            csv.push_str("0,0.05\n");
        }
    }
    csv
}

fn sources() -> DataSources {
    DataSources::new(
        RowSource::stream("sensorID_28_standardized.csv", readings_csv()),
        Some(RowSource::stream("anomaly_results.csv", anomalies_csv())),
    )
}

fn set_window(state: SessionState, cache: &DatasetCache, start: &str, end: &str) -> SessionState {
    let (state, _) = handle(
        state,
        Interaction::SetManualText {
            start: start.to_string(),
            end: end.to_string(),
        },
        cache,
        &sources(),
    );
    let (state, pass) = handle(state, Interaction::Submit, cache, &sources());
    pass.unwrap();
    state
}

#[test]
fn window_selects_rows_in_range() {
    let cache = DatasetCache::new();
    let state = set_window(
        SessionState::default(),
        &cache,
        "2025-02-06 02:10:00",
        "2025-02-06 02:30:00",
    );
    let (_, pass) = handle(state, Interaction::Refresh, &cache, &sources());
    let pass = pass.unwrap();
    assert_eq!(pass.rows_total, 100);
    assert_eq!(pass.rows_in_window, 50);

    let chart = pass.scaled_chart.unwrap();
    let trace = chart.trace("Resistance (scaled)").unwrap();
    assert_eq!(trace.points.first().unwrap().x, "2025-02-06 02:10:00");
    assert_eq!(trace.points.last().unwrap().x, "2025-02-06 02:30:00");
}

#[test]
fn anomaly_ratios_overall_and_in_window() {
    let cache = DatasetCache::new();
    let state = set_window(
        SessionState::default(),
        &cache,
        "2025-02-06 02:10:00",
        "2025-02-06 02:30:00",
    );
    let (_, pass) = handle(state, Interaction::ToggleAnomalies(true), &cache, &sources());
    let pass = pass.unwrap();

    let overall = pass.overall_ratio.unwrap();
    assert_eq!((overall.count, overall.total, overall.percent), (2, 100, 2.0));
    let in_window = pass.window_ratio.unwrap();
    assert_eq!((in_window.count, in_window.total, in_window.percent), (1, 50, 2.0));
}

#[test]
fn export_contains_flagged_rows_of_window() {
    let cache = DatasetCache::new();
    let (state, _) = handle(
        SessionState::default(),
        Interaction::ToggleAnomalies(true),
        &cache,
        &sources(),
    );
    let (_, pass) = handle(state, Interaction::Refresh, &cache, &sources());
    let export = pass.unwrap().export.unwrap();
    assert_eq!(export.file_name, "filtered_anomalies.csv");
    assert_eq!(export.mime, "text/csv");

    let text = String::from_utf8(export.bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("temperature_scaled,res_spike_anomaly,res_spike_anomaly_score"));
    assert!(lines[1].starts_with("2025-02-06 02:00:00,5.0,"));
    assert!(lines[1].ends_with(",1,0.93"));
    assert!(lines[2].starts_with("2025-02-06 02:20:00,42.0,"));
}

#[test]
fn export_absent_when_toggle_off() {
    let cache = DatasetCache::new();
    let (_, pass) = handle(
        SessionState::default(),
        Interaction::SelectRaw(RawChoice::Metric(Metric::Resistance)),
        &cache,
        &sources(),
    );
    let pass = pass.unwrap();
    assert!(pass.scaled_chart.is_some());
    assert!(pass.raw_chart.is_some());
    assert!(!pass.export_visible);
    assert!(pass.export.is_none());
}

#[test]
fn export_absent_without_any_chart() {
    let cache = DatasetCache::new();
    let (state, _) = handle(
        SessionState::default(),
        Interaction::ToggleAnomalies(true),
        &cache,
        &sources(),
    );
    let (state, pass) = handle(state, Interaction::SelectScaled(vec![]), &cache, &sources());
    assert_eq!(state.selection.raw, RawChoice::None);
    let pass = pass.unwrap();
    assert!(pass.scaled_chart.is_none());
    assert!(pass.raw_chart.is_none());
    assert!(!pass.export_visible);
    assert!(pass.export.is_none());
}

#[test]
fn malformed_manual_window_leaves_state_identical() {
    let cache = DatasetCache::new();
    let state = set_window(
        SessionState::default(),
        &cache,
        "2025-02-06 02:10:00",
        "2025-02-06 02:30:00",
    );
    let (state, _) = handle(
        state,
        Interaction::SetManualText {
            start: "06/02/2025 02:10".to_string(),
            end: "2025-02-06 02:30:00".to_string(),
        },
        &cache,
        &sources(),
    );
    let (after, pass) = handle(state.clone(), Interaction::Submit, &cache, &sources());
    assert!(pass.is_err());
    assert_eq!(after, state);
    assert_eq!(after.window.window.to_string(), "2025-02-06 02:10:00 ~ 2025-02-06 02:30:00");
}

#[test]
fn navigation_collapses_width_to_step() {
    let cache = DatasetCache::new();
    let (state, _) = handle(
        SessionState::default(),
        Interaction::SetStep(StepSize::Minutes15),
        &cache,
        &sources(),
    );
    let (state, pass) = handle(state, Interaction::Advance, &cache, &sources());
    assert_eq!(state.window.window.to_string(), "2025-02-06 02:50:00 ~ 2025-02-06 03:05:00");
    assert_eq!(pass.unwrap().rows_in_window, 0);

    let (state, pass) = handle(state, Interaction::Retreat, &cache, &sources());
    assert_eq!(state.window.window.to_string(), "2025-02-06 02:35:00 ~ 2025-02-06 02:50:00");
    assert_eq!(pass.unwrap().rows_in_window, 30);
}

#[test]
fn reload_after_invalidate_reads_source_again() {
    let cache = DatasetCache::new();
    let sources = sources();
    let (state, _) = handle(SessionState::default(), Interaction::Refresh, &cache, &sources);
    assert_eq!(cache.len(), 1);
    assert!(cache.invalidate(&sources.primary.key()));
    let (_, pass) = handle(state, Interaction::Refresh, &cache, &sources);
    assert_eq!(pass.unwrap().rows_total, 100);
    assert_eq!(cache.len(), 1);
}
