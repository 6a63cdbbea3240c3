//! Eco-counter catalogue and timeseries payload parsing
//!
//! The open-data portal serves NGSI-LD entities: scalar attributes are
//! wrapped in `{"type": "Property", "value": ...}` envelopes and the
//! location is a GeoJSON Point with `[longitude, latitude]` ordering.
//! Timeseries come back as parallel `index`/`values` arrays.

use serde::Deserialize;

use super::IngestError;
use crate::utils::time::parse_iso_timestamp;

/// Catalogue entry reduced to what the store needs
#[derive(Debug, Clone, PartialEq)]
pub struct CounterMeta {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub serial: Option<String>,
}

#[derive(Deserialize)]
struct CatalogueEntity {
    id: String,
    name: Option<Property<String>>,
    location: Option<GeoProperty>,
    #[serde(rename = "serialNumber")]
    serial_number: Option<Property<String>>,
}

#[derive(Deserialize)]
struct Property<T> {
    value: T,
}

#[derive(Deserialize)]
struct GeoProperty {
    value: GeoPoint,
}

#[derive(Deserialize)]
struct GeoPoint {
    coordinates: Vec<f64>,
}

/// Parse the counter catalogue response
///
/// Entities without a usable location are skipped with a warning; a
/// missing name falls back to the entity id.
pub fn parse_catalogue(body: &str) -> Result<Vec<CounterMeta>, IngestError> {
    let entities: Vec<CatalogueEntity> =
        serde_json::from_str(body).map_err(|e| IngestError::Parse(e.to_string()))?;

    let mut out = Vec::with_capacity(entities.len());
    for entity in entities {
        let Some(location) = &entity.location else {
            tracing::warn!(counter = %entity.id, "Catalogue entry without location, skipping");
            continue;
        };
        // GeoJSON Point is [lon, lat]
        let [longitude, latitude] = location.value.coordinates[..] else {
            tracing::warn!(counter = %entity.id, "Malformed coordinates, skipping");
            continue;
        };
        let name = entity
            .name
            .map(|p| p.value)
            .unwrap_or_else(|| entity.id.clone());
        out.push(CounterMeta {
            id: entity.id,
            name,
            latitude,
            longitude,
            serial: entity.serial_number.map(|p| p.value),
        });
    }
    Ok(out)
}

#[derive(Deserialize)]
struct TimeseriesResponse {
    index: Vec<String>,
    values: Vec<Option<f64>>,
}

/// Parse a timeseries response into (unix seconds, value) pairs
///
/// Null values and unparseable timestamps are dropped; negative counts
/// are upstream glitches and are dropped too.
pub fn parse_timeseries(body: &str) -> Result<Vec<(i64, f64)>, IngestError> {
    let response: TimeseriesResponse =
        serde_json::from_str(body).map_err(|e| IngestError::Parse(e.to_string()))?;

    if response.index.len() != response.values.len() {
        return Err(IngestError::Parse(format!(
            "index/values length mismatch: {} vs {}",
            response.index.len(),
            response.values.len()
        )));
    }

    Ok(response
        .index
        .iter()
        .zip(&response.values)
        .filter_map(|(ts, value)| {
            let value = (*value)?;
            if value < 0.0 {
                tracing::warn!(timestamp = %ts, value, "Dropping negative reading");
                return None;
            }
            let dt = parse_iso_timestamp(ts)?;
            Some((dt.timestamp(), value))
        })
        .collect())
}
