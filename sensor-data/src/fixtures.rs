//! Test datasets.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use csv::StringRecord;
use sensor_core::reading::{AnomalyAnnotation, AnomalyDataset, Dataset, Reading, RecordTime};

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 2, 6)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

pub fn reading(time: RecordTime, value: f64) -> Reading {
    Reading {
        timestamp: time,
        current: value,
        voltage: value * 2.0,
        resistance: value * 3.0,
        temperature: value * 4.0,
        current_scaled: value / 10.0,
        voltage_scaled: value / 20.0,
        resistance_scaled: value / 30.0,
        temperature_scaled: value / 40.0,
    }
}

pub fn dataset_from_times(times: Vec<RecordTime>) -> Dataset {
    let readings: Vec<Reading> = times
        .into_iter()
        .enumerate()
        .map(|(i, t)| reading(t, i as f64))
        .collect();
    let records = readings
        .iter()
        .map(|r| StringRecord::from(vec![r.timestamp.to_string()]))
        .collect();
    Dataset {
        source_name: "fixture.csv".to_string(),
        headers: StringRecord::from(vec!["record Time"]),
        records,
        readings,
    }
}

/// 100 rows from 02:00:00 to 02:45:00, ten rows sharing each 5-minute bucket.
pub fn bucketed() -> Dataset {
    dataset_from_times(
        (0..100)
            .map(|i| RecordTime::At(at(2, 0, 0) + TimeDelta::minutes(5 * (i / 10))))
            .collect(),
    )
}

/// Anomaly rows for `rows` rows with the given rows flagged.
pub fn anomalies(rows: usize, flagged: &[usize]) -> AnomalyDataset {
    AnomalyDataset {
        source_name: "anomalies.csv".to_string(),
        annotations: (0..rows)
            .map(|i| AnomalyAnnotation {
                res_spike_anomaly: flagged.contains(&i),
                res_spike_anomaly_score: if flagged.contains(&i) { 0.9 } else { 0.1 },
            })
            .collect(),
    }
}
