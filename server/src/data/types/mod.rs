//! Shared row and point types for the data layer

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A single raw observation from a counter or weather series.
///
/// Append-only: ingested once, never mutated. Duplicates are suppressed by
/// the store's (series, timestamp) uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub series_key: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Counter metadata as stored, maintained by ingestion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CounterRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Physical sensor serial; updated in place when the operator swaps
    /// hardware under the same counter id.
    pub serial: Option<String>,
    pub active: bool,
    /// Unix seconds
    pub first_seen: i64,
    /// Unix seconds
    pub last_seen: i64,
}

/// One hourly weather observation for a zone.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeatherPoint {
    pub zone: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_point_equality() {
        let a = TimePoint {
            series_key: "c1".into(),
            timestamp: DateTime::UNIX_EPOCH,
            value: 3.0,
        };
        assert_eq!(a, a.clone());
    }
}
