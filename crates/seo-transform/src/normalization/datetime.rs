//! Timestamp coercion.
//!
//! Crawlers emit `Last-Modified` values verbatim from response headers, so
//! the RFC 2822 form is tried first. Zoned values are converted to UTC and
//! stored without an offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a timestamp cell, returning `None` when no known format matches.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(zoned) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(zoned.naive_utc());
    }
    if let Ok(zoned) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(zoned.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .expect("valid timestamp")
    }

    #[test]
    fn parses_http_date() {
        assert_eq!(
            parse_timestamp("Tue, 05 Mar 2024 10:00:00 GMT"),
            Some(at(2024, 3, 5, 10, 0, 0))
        );
    }

    #[test]
    fn converts_offsets_to_utc() {
        assert_eq!(
            parse_timestamp("2024-03-05T12:00:00+02:00"),
            Some(at(2024, 3, 5, 10, 0, 0))
        );
    }

    #[test]
    fn parses_naive_forms() {
        assert_eq!(
            parse_timestamp("2023-11-30 08:15:00"),
            Some(at(2023, 11, 30, 8, 15, 0))
        );
        assert_eq!(parse_timestamp("2023-11-30"), Some(at(2023, 11, 30, 0, 0, 0)));
        assert_eq!(parse_timestamp("11/30/2023"), Some(at(2023, 11, 30, 0, 0, 0)));
    }

    #[test]
    fn malformed_values_are_missing() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2023-13-40"), None);
    }
}
