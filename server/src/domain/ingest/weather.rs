//! Open-Meteo hourly forecast parsing
//!
//! Hourly arrays are parallel to the `time` array; timestamps come back
//! as naive `YYYY-MM-DDTHH:MM` strings in the requested timezone (we
//! always request UTC).

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::IngestError;

#[derive(Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

/// Parse an hourly forecast into (unix seconds, temperature, precipitation)
///
/// Either variable may be missing or shorter than `time`; absent slots
/// become `None` rather than dropping the hour.
pub fn parse_hourly_weather(body: &str) -> Result<Vec<(i64, Option<f64>, Option<f64>)>, IngestError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| IngestError::Parse(e.to_string()))?;

    let hourly = response.hourly;
    let mut out = Vec::with_capacity(hourly.time.len());
    for (i, ts) in hourly.time.iter().enumerate() {
        let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M") else {
            tracing::warn!(timestamp = %ts, "Unparseable forecast timestamp, skipping");
            continue;
        };
        let secs = naive.and_utc().timestamp();
        let temperature = hourly.temperature_2m.get(i).copied().flatten();
        let precipitation = hourly.precipitation.get(i).copied().flatten();
        out.push((secs, temperature, precipitation));
    }
    Ok(out)
}
