//! Tooltip text for chart points.

use sensor_core::reading::{AnomalyAnnotation, Reading};

fn detail_lines(reading: &Reading) -> String {
    format!(
        "Time: {}<br>Current: {:.2}<br>Voltage: {:.2}<br>Resistance: {:.4}<br>Temperature: {:.2}",
        reading.timestamp, reading.current, reading.voltage, reading.resistance, reading.temperature
    )
}

/// Hover text for an ordinary point.
pub fn hover_text(reading: &Reading) -> String {
    detail_lines(reading)
}

/// Hover text for a highlighted anomaly point, in red and with its score.
pub fn anomaly_hover_text(reading: &Reading, annotation: &AnomalyAnnotation) -> String {
    format!(
        "<span style='color:red'>{}<br>Score: {:.4}</span>",
        detail_lines(reading),
        annotation.res_spike_anomaly_score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sensor_core::reading::RecordTime;

    fn reading() -> Reading {
        Reading {
            timestamp: RecordTime::At(
                NaiveDate::from_ymd_opt(2025, 2, 6)
                    .unwrap()
                    .and_hms_opt(2, 15, 0)
                    .unwrap(),
            ),
            current: 1.234,
            voltage: 220.5,
            resistance: 0.012345,
            temperature: 35.0,
            current_scaled: 0.0,
            voltage_scaled: 0.0,
            resistance_scaled: 0.0,
            temperature_scaled: 0.0,
        }
    }

    #[test]
    fn test_hover_text() {
        assert_eq!(
            hover_text(&reading()),
            "Time: 2025-02-06 02:15:00<br>Current: 1.23<br>Voltage: 220.50<br>Resistance: 0.0123<br>Temperature: 35.00"
        );
    }

    #[test]
    fn test_anomaly_hover_text() {
        let annotation = AnomalyAnnotation {
            res_spike_anomaly: true,
            res_spike_anomaly_score: 0.98766,
        };
        let text = anomaly_hover_text(&reading(), &annotation);
        assert!(text.starts_with("<span style='color:red'>Time: 2025-02-06 02:15:00<br>"));
        assert!(text.ends_with("<br>Score: 0.9877</span>"));
    }
}
