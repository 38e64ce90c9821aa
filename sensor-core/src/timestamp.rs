use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used for manual window entry and for displaying instants: "YYYY-MM-DD HH:MM:SS"
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Name of the timestamp column in the primary dataset.
pub const RECORD_TIME_COLUMN: &str = "record Time";

/// Formats accepted for `record Time` values, tried in order.
const DATASET_FORMATS: [&str; 4] = [
    TIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Format an instant as "YYYY-MM-DD HH:MM:SS"
pub fn format_instant(instant: &NaiveDateTime) -> String {
    instant.format(TIME_FORMAT).to_string()
}

/// Parse a manually entered instant. Only the exact "YYYY-MM-DD HH:MM:SS"
/// format is accepted, with a four-digit year.
pub fn parse_manual(s: &str) -> Result<NaiveDateTime, ParseError> {
    let invalid = || ParseError {
        input: s.to_string(),
    };
    let bytes = s.as_bytes();
    let four_digit_year = bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-';
    if !four_digit_year {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(s, TIME_FORMAT).map_err(|_| invalid())
}

/// Parse a `record Time` value from a dataset.
///
/// Accepts "YYYY-MM-DD HH:MM:SS", ISO-8601 with a `T` separator and optional
/// fractional seconds, RFC 3339 with an offset (the wall-clock time at that
/// offset is kept), "YYYY-MM-DD HH:MM" and a bare date meaning midnight.
pub fn parse_record_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in DATASET_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(s, format) {
            return Some(instant);
        }
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(s) {
        return Some(with_offset.naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 6)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_manual_exact_format() {
        assert_eq!(parse_manual("2025-02-06 02:10:00").unwrap(), at(2, 10, 0));
    }

    #[test]
    fn test_parse_manual_rejects_other_formats() {
        assert!(parse_manual("2025-02-06T02:10:00").is_err());
        assert!(parse_manual("2025-02-06 02:10").is_err());
        assert!(parse_manual("").is_err());
        assert!(parse_manual("+262142-12-31 23:59:59").is_err());
        assert!(parse_manual("12025-02-06 02:10:00").is_err());
        assert!(parse_manual("-0001-02-06 02:10:00").is_err());
        let err = parse_manual("02/06/2025").unwrap_err();
        assert_eq!(err.input, "02/06/2025");
    }

    #[test]
    fn test_parse_record_time_variants() {
        assert_eq!(parse_record_time("2025-02-06 02:10:00"), Some(at(2, 10, 0)));
        assert_eq!(parse_record_time("2025-02-06T02:10:00"), Some(at(2, 10, 0)));
        assert_eq!(
            parse_record_time("2025-02-06T02:10:00.000"),
            Some(at(2, 10, 0))
        );
        assert_eq!(
            parse_record_time("2025-02-06T02:10:00+08:00"),
            Some(at(2, 10, 0))
        );
        assert_eq!(parse_record_time("2025-02-06 02:10"), Some(at(2, 10, 0)));
        assert_eq!(parse_record_time("2025-02-06"), Some(at(0, 0, 0)));
        assert_eq!(parse_record_time(" 2025-02-06 02:10:00 "), Some(at(2, 10, 0)));
        assert_eq!(parse_record_time("not a time"), None);
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(format_instant(&at(2, 5, 9)), "2025-02-06 02:05:09");
    }
}
