//! The flagged-rows download.
//!
//! The export reproduces every column of the primary source, in source
//! order, for each flagged row of the current window, followed by the two
//! annotation columns. The time column is rewritten as
//! "YYYY-MM-DD HH:MM:SS" whatever form the source used. It is UTF-8 with a byte-order mark so spreadsheet
//! tools pick the right encoding.

use sensor_core::reading::{ANOMALY_FLAG_COLUMN, ANOMALY_SCORE_COLUMN};
use sensor_core::timestamp::format_instant;
use sensor_data::annotate::AnnotatedDataset;
use sensor_data::filter::FilteredView;

/// Fixed file name offered for the download.
pub const EXPORT_FILE_NAME: &str = "filtered_anomalies.csv";

pub const EXPORT_MIME: &str = "text/csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A ready-to-download file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize the flagged rows of `view` as CSV.
pub fn export_flagged(
    view: &FilteredView<'_>,
    annotated: &AnnotatedDataset<'_>,
    time_column: &str,
    file_name: &str,
) -> Result<ExportFile, csv::Error> {
    let flagged = annotated.flagged(view);
    let dataset = view.dataset;
    let time_idx = dataset.headers.iter().position(|h| h == time_column);

    let mut wtr = csv::Writer::from_writer(UTF8_BOM.to_vec());
    let mut header: Vec<&str> = dataset.headers.iter().collect();
    header.extend([ANOMALY_FLAG_COLUMN, ANOMALY_SCORE_COLUMN]);
    wtr.write_record(&header)?;

    for &row in &flagged.rows {
        let Some(annotation) = annotated.annotation(row) else {
            continue;
        };
        let score = if annotation.res_spike_anomaly_score.is_nan() {
            String::new()
        } else {
            annotation.res_spike_anomaly_score.to_string()
        };
        let mut fields: Vec<String> = dataset.records[row].iter().map(str::to_string).collect();
        let instant = dataset.readings[row].timestamp.instant();
        if let (Some(field), Some(instant)) = (time_idx.and_then(|i| fields.get_mut(i)), instant) {
            *field = format_instant(&instant);
        }
        fields.push(u8::from(annotation.res_spike_anomaly).to_string());
        fields.push(score);
        wtr.write_record(&fields)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    log::info!(
        "export: {} flagged rows of {} in {} ({} bytes)",
        flagged.len(),
        view.len(),
        file_name,
        bytes.len()
    );
    Ok(ExportFile {
        file_name: file_name.to_string(),
        mime: EXPORT_MIME,
        bytes,
    })
}
