//! Timestamp utilities
//!
//! Feed cells and HTTP headers carry dates in a handful of shapes. Everything
//! is normalized to `DateTime<Utc>` here; a cell that matches none of the
//! accepted shapes is reported as `None` and the caller decides the fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Date-time layouts carrying an explicit offset that RFC 3339 rejects
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Date-time layouts without offset, interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert milliseconds to duration
pub fn millis_to_duration(millis: u64) -> std::time::Duration {
    std::time::Duration::from_millis(millis)
}

/// Parse a feed or header timestamp.
///
/// Accepts RFC 3339, RFC 2822 / HTTP-date (`Mon, 17 Feb 2025 00:00:00 GMT`),
/// ISO date-times without offset (UTC) and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Format as ISO-8601 with millisecond precision and `Z` suffix
pub fn to_iso_millis(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_millis_to_duration() {
        assert_eq!(millis_to_duration(0), Duration::from_millis(0));
        assert_eq!(millis_to_duration(15_000), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_rfc3339_with_zulu() {
        let ts = parse_timestamp("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.year(), 2025);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_with_offset_normalizes_to_utc() {
        let ts = parse_timestamp("2025-03-10T08:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 6);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn test_parse_http_date() {
        let ts = parse_timestamp("Mon, 17 Feb 2025 00:00:00 GMT").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 2, 17));
    }

    #[test]
    fn test_parse_offset_without_colon() {
        let ts = parse_timestamp("2025-03-10T08:30:00+0100").unwrap();
        assert_eq!(ts.hour(), 7);
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let ts = parse_timestamp("2025-06-01 12:15:00").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (12, 15));

        let ts = parse_timestamp("2025-06-01T12:15").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (12, 15));
    }

    #[test]
    fn test_parse_bare_date_is_midnight_utc() {
        let ts = parse_timestamp(" 2024-12-30 ").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2024, 12, 30, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("last tuesday").is_none());
        assert!(parse_timestamp("2025-13-45").is_none());
    }

    #[test]
    fn test_to_iso_millis() {
        let ts = parse_timestamp("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(to_iso_millis(&ts), "2025-01-01T00:00:00.000Z");
    }
}
