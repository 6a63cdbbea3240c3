//! Weather readings repository
//!
//! Hourly weather observations per zone, stored alongside counter data so
//! traffic anomalies can be read against the conditions that caused them.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::WeatherPoint;
use crate::utils::time::secs_to_datetime;

/// Insert or replace weather observations for a zone
///
/// Forecast rows firm up as observations; the latest value wins.
pub async fn upsert_weather(
    pool: &SqlitePool,
    zone: &str,
    observations: &[(i64, Option<f64>, Option<f64>)],
) -> Result<u64, SqliteError> {
    if observations.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut written = 0u64;
    for (timestamp, temperature, precipitation) in observations {
        let result = sqlx::query(
            r#"
            INSERT INTO weather_readings (zone, timestamp, temperature, precipitation)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (zone, timestamp) DO UPDATE SET
                temperature = excluded.temperature,
                precipitation = excluded.precipitation
            "#,
        )
        .bind(zone)
        .bind(timestamp)
        .bind(temperature)
        .bind(precipitation)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }
    tx.commit().await?;

    Ok(written)
}

/// Most recent stored observation timestamp for a zone, if any
pub async fn latest_timestamp(pool: &SqlitePool, zone: &str) -> Result<Option<i64>, SqliteError> {
    let (max,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(timestamp) FROM weather_readings WHERE zone = ?")
            .bind(zone)
            .fetch_one(pool)
            .await?;
    Ok(max)
}

/// Fetch observations for a zone in `[from, to]`, timestamp-ascending
pub async fn fetch_range(
    pool: &SqlitePool,
    zone: &str,
    from: i64,
    to: i64,
) -> Result<Vec<WeatherPoint>, SqliteError> {
    let rows: Vec<(i64, Option<f64>, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT timestamp, temperature, precipitation
        FROM weather_readings
        WHERE zone = ? AND timestamp >= ? AND timestamp <= ?
        ORDER BY timestamp ASC
        "#,
    )
    .bind(zone)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(timestamp, temperature, precipitation)| WeatherPoint {
            zone: zone.to_string(),
            timestamp: secs_to_datetime(timestamp),
            temperature,
            precipitation,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_upsert_weather_replaces_forecast() {
        let pool = setup_test_pool().await;

        upsert_weather(&pool, "mtp", &[(3600, Some(18.0), Some(0.0))])
            .await
            .unwrap();
        upsert_weather(&pool, "mtp", &[(3600, Some(17.2), Some(1.4))])
            .await
            .unwrap();

        let points = fetch_range(&pool, "mtp", 0, 10_000).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].temperature, Some(17.2));
        assert_eq!(points[0].precipitation, Some(1.4));
    }

    #[tokio::test]
    async fn test_latest_timestamp_per_zone() {
        let pool = setup_test_pool().await;

        assert_eq!(latest_timestamp(&pool, "mtp").await.unwrap(), None);

        upsert_weather(&pool, "mtp", &[(3600, Some(18.0), None), (7200, None, Some(0.2))])
            .await
            .unwrap();

        assert_eq!(latest_timestamp(&pool, "mtp").await.unwrap(), Some(7200));
        assert_eq!(latest_timestamp(&pool, "elsewhere").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_range_zone_isolation() {
        let pool = setup_test_pool().await;

        upsert_weather(&pool, "mtp", &[(3600, Some(18.0), None)])
            .await
            .unwrap();
        upsert_weather(&pool, "other", &[(3600, Some(5.0), None)])
            .await
            .unwrap();

        let points = fetch_range(&pool, "mtp", 0, 10_000).await.unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].zone, "mtp");
        assert_eq!(points[0].temperature, Some(18.0));
    }
}
