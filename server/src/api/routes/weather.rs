//! Weather observations endpoint
//!
//! Serves the ingested Open-Meteo rows so the dashboard can plot traffic
//! against the conditions of the same days.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::types::{ApiError, parse_date_param};
use crate::core::constants::WEATHER_ZONE_MONTPELLIER;
use crate::data::sqlite::SqliteService;
use crate::data::sqlite::repositories::weather;
use crate::data::types::WeatherPoint;
use crate::domain::calendar;
use crate::utils::time::secs_to_datetime;

/// Shared state for the weather endpoint
#[derive(Clone)]
pub struct WeatherApiState {
    pub database: Arc<SqliteService>,
}

/// Build weather API routes
pub fn routes(database: Arc<SqliteService>) -> Router<()> {
    Router::new()
        .route("/", get(get_weather))
        .with_state(WeatherApiState { database })
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeatherResponse {
    pub zone: &'static str,
    /// Most recent stored observation, regardless of the requested range
    pub latest: Option<DateTime<Utc>>,
    pub points: Vec<WeatherPoint>,
}

/// Hourly weather observations for the Montpellier zone
#[utoipa::path(
    get,
    path = "/api/v1/weather",
    tag = "weather",
    params(
        ("from" = String, Query, description = "Range start, YYYY-MM-DD (Paris-local)"),
        ("to" = String, Query, description = "Range end, YYYY-MM-DD (Paris-local, inclusive)")
    ),
    responses(
        (status = 200, description = "Hourly observations, timestamp-ascending", body = WeatherResponse),
        (status = 400, description = "Missing or malformed date")
    )
)]
pub async fn get_weather(
    State(state): State<WeatherApiState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let from = parse_date_param(&query.from, "from")?;
    let to = parse_date_param(&query.to, "to")?;

    let pool = state.database.pool();
    let zone = WEATHER_ZONE_MONTPELLIER;
    let (points, latest) = tokio::try_join!(
        weather::fetch_range(
            pool,
            zone,
            calendar::day_start(from).timestamp(),
            calendar::day_end(to).timestamp(),
        ),
        weather::latest_timestamp(pool, zone),
    )
    .map_err(ApiError::from_sqlite)?;

    Ok(Json(WeatherResponse {
        zone,
        latest: latest.map(secs_to_datetime),
        points,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    async fn seeded_state() -> WeatherApiState {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        let database = Arc::new(SqliteService::from_pool(pool).await.unwrap());

        // 2024-06-15 10:00 and 11:00 UTC, plus one row outside the range
        weather::upsert_weather(
            database.pool(),
            WEATHER_ZONE_MONTPELLIER,
            &[
                (1718445600, Some(24.5), Some(0.0)),
                (1718449200, Some(25.1), Some(0.2)),
                (1718877600, Some(19.0), None),
            ],
        )
        .await
        .unwrap();

        WeatherApiState { database }
    }

    #[tokio::test]
    async fn test_weather_range_with_latest() {
        let Json(body) = get_weather(
            State(seeded_state().await),
            Query(WeatherQuery {
                from: Some("2024-06-15".to_string()),
                to: Some("2024-06-15".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body.zone, WEATHER_ZONE_MONTPELLIER);
        assert_eq!(body.points.len(), 2);
        assert_eq!(body.points[0].temperature, Some(24.5));
        assert_eq!(body.points[1].precipitation, Some(0.2));
        // Latest reflects the newest stored row, not the range
        assert_eq!(body.latest, Some(secs_to_datetime(1718877600)));
    }

    #[tokio::test]
    async fn test_weather_requires_range() {
        let err = get_weather(
            State(seeded_state().await),
            Query(WeatherQuery {
                from: Some("2024-06-15".to_string()),
                to: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest { .. }));
    }
}
