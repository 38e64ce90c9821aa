//! CSV loading for the primary and anomaly datasets.
//!
//! # CSV Formats
//!
//! - **Primary** (has headers): a timestamp column (`record Time` by default)
//!   plus `current, voltage, resistance, temperature` and their `*_scaled`
//!   companions. Other columns are kept verbatim for export.
//! - **Anomalies** (has headers): `res_spike_anomaly` (0/1) and
//!   `res_spike_anomaly_score`, one row per primary row in the same order.
//!
//! Empty numeric cells load as NaN.

use crate::{LoadOptions, RowSource, TimestampPolicy};
use csv::StringRecord;
use sensor_core::error::LoadError;
use sensor_core::reading::{
    AnomalyAnnotation, AnomalyDataset, Dataset, Metric, Reading, RecordTime, ANOMALY_FLAG_COLUMN,
    ANOMALY_SCORE_COLUMN,
};
use sensor_core::timestamp::parse_record_time;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Load the primary dataset.
pub fn load_dataset(source: &RowSource, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let source_name = source.name();
    let bytes = source.read_bytes()?;
    let (headers, rows) = read_records(&source_name, &bytes, options.delimiter)?;

    let time_idx = column_index(&headers, &options.time_column, &source_name)?;
    let mut raw_idx = [0usize; 4];
    let mut scaled_idx = [0usize; 4];
    for (i, metric) in Metric::ALL.iter().enumerate() {
        raw_idx[i] = column_index(&headers, metric.column(), &source_name)?;
        scaled_idx[i] = column_index(&headers, metric.scaled_column(), &source_name)?;
    }

    let mut readings = Vec::with_capacity(rows.len());
    let mut unparsed = 0u32;
    for (row, record) in rows.iter().enumerate() {
        let raw_time = record.get(time_idx).unwrap_or("").trim();
        let timestamp = match parse_record_time(raw_time) {
            Some(instant) => RecordTime::At(instant),
            None if options.timestamp_policy == TimestampPolicy::Lenient => {
                unparsed += 1;
                RecordTime::Unparsed(raw_time.to_string())
            }
            None => {
                return Err(malformed(&source_name, row, &options.time_column, raw_time));
            }
        };
        let field = |idx: usize| -> Result<f64, LoadError> {
            parse_number(record.get(idx).unwrap_or(""))
                .ok_or_else(|| malformed(&source_name, row, &headers[idx], record.get(idx).unwrap_or("")))
        };
        readings.push(Reading {
            timestamp,
            current: field(raw_idx[0])?,
            voltage: field(raw_idx[1])?,
            resistance: field(raw_idx[2])?,
            temperature: field(raw_idx[3])?,
            current_scaled: field(scaled_idx[0])?,
            voltage_scaled: field(scaled_idx[1])?,
            resistance_scaled: field(scaled_idx[2])?,
            temperature_scaled: field(scaled_idx[3])?,
        });
    }

    if unparsed > 0 {
        log::warn!(
            "loader: kept {} rows of {} with unparsed '{}' values",
            unparsed,
            source_name,
            options.time_column
        );
    }
    log::info!("loader: Loaded {} readings from {}", readings.len(), source_name);
    Ok(Dataset {
        source_name,
        headers,
        records: rows,
        readings,
    })
}

/// Load the anomaly dataset.
pub fn load_anomalies(source: &RowSource, options: &LoadOptions) -> Result<AnomalyDataset, LoadError> {
    let source_name = source.name();
    let bytes = source.read_bytes()?;
    let (headers, rows) = read_records(&source_name, &bytes, options.delimiter)?;
    let flag_idx = column_index(&headers, ANOMALY_FLAG_COLUMN, &source_name)?;
    let score_idx = column_index(&headers, ANOMALY_SCORE_COLUMN, &source_name)?;

    let annotations = rows
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let flag = record.get(flag_idx).unwrap_or("");
            let score = record.get(score_idx).unwrap_or("");
            Ok(AnomalyAnnotation {
                res_spike_anomaly: parse_flag(flag)
                    .ok_or_else(|| malformed(&source_name, row, ANOMALY_FLAG_COLUMN, flag))?,
                res_spike_anomaly_score: parse_number(score)
                    .ok_or_else(|| malformed(&source_name, row, ANOMALY_SCORE_COLUMN, score))?,
            })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    log::info!(
        "loader: Loaded {} anomaly rows ({} flagged) from {}",
        annotations.len(),
        annotations.iter().filter(|a| a.res_spike_anomaly).count(),
        source_name
    );
    Ok(AnomalyDataset {
        source_name,
        annotations,
    })
}

fn read_records(
    source_name: &str,
    bytes: &[u8],
    delimiter: u8,
) -> Result<(StringRecord, Vec<StringRecord>), LoadError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(LoadError::Empty {
            source_name: source_name.to_string(),
        });
    }
    let csv_error = |error: csv::Error| LoadError::Csv {
        source_name: source_name.to_string(),
        error,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);
    let headers = rdr.headers().map_err(csv_error)?.clone();
    let rows = rdr
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()
        .map_err(csv_error)?;
    Ok((headers, rows))
}

fn column_index(headers: &StringRecord, column: &str, source_name: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| LoadError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        })
}

fn malformed(source_name: &str, row: usize, column: &str, value: &str) -> LoadError {
    LoadError::Malformed {
        source_name: source_name.to_string(),
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(f64::NAN);
    }
    s.parse().ok()
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}
