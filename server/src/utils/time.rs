//! Time utility functions

use chrono::{DateTime, NaiveDate, Utc};

/// Parse ISO 8601 / RFC 3339 timestamp string to DateTime<Utc>
pub fn parse_iso_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Parse a plain `YYYY-MM-DD` calendar date
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Convert unix seconds to DateTime<Utc>, warning and clamping to the epoch
/// on out-of-range input
pub fn secs_to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(|| {
        tracing::warn!(secs, "Invalid timestamp, using epoch");
        DateTime::UNIX_EPOCH
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_iso_timestamp_valid() {
        let dt = parse_iso_timestamp("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_iso_timestamp_with_offset() {
        let dt = parse_iso_timestamp("2024-01-15T10:30:00+05:00").unwrap();
        assert_eq!(dt.hour(), 5);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_iso_timestamp_invalid() {
        assert!(parse_iso_timestamp("not-a-timestamp").is_none());
    }

    #[test]
    fn test_parse_iso_date() {
        let d = parse_iso_date("2024-06-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 6, 15));
        assert!(parse_iso_date("2024-13-01").is_none());
        assert!(parse_iso_date("15/06/2024").is_none());
    }

    #[test]
    fn test_secs_to_datetime() {
        let dt = secs_to_datetime(1704067200);
        assert_eq!(dt.year(), 2024);
        assert_eq!(secs_to_datetime(i64::MAX), DateTime::UNIX_EPOCH);
    }
}
