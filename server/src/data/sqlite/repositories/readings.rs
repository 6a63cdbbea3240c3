//! Counter readings repository
//!
//! Raw quarter-hourly (or coarser) readings keyed by (counter, timestamp).
//! Timestamps are unix seconds UTC; all calendar interpretation happens in
//! the domain layer.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::TimePoint;
use crate::domain::calendar;
use crate::domain::stats::bucket::{self, DayBucket};
use crate::utils::time::secs_to_datetime;

/// Insert readings for a counter, skipping timestamps already stored
///
/// Returns the number of rows actually inserted. Re-ingesting an
/// overlapping window is a no-op for the overlap.
pub async fn insert_readings(
    pool: &SqlitePool,
    counter_id: &str,
    readings: &[(i64, f64)],
) -> Result<u64, SqliteError> {
    if readings.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;
    for (timestamp, value) in readings {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO counter_readings (counter_id, timestamp, value)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(counter_id)
        .bind(timestamp)
        .bind(value)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;

    Ok(inserted)
}

/// Most recent stored reading timestamp for a counter, if any
///
/// Drives incremental ingestion: the next fetch resumes from here.
pub async fn latest_timestamp(
    pool: &SqlitePool,
    counter_id: &str,
) -> Result<Option<i64>, SqliteError> {
    // MAX over an empty set yields a single NULL row
    let (max,): (Option<i64>,) =
        sqlx::query_as("SELECT MAX(timestamp) FROM counter_readings WHERE counter_id = ?")
            .bind(counter_id)
            .fetch_one(pool)
            .await?;
    Ok(max)
}

/// Fetch raw points in `[from, to]`, timestamp-ascending
///
/// `counter` narrows to one series; `None` returns every counter's rows
/// (the aggregators sum across series).
pub async fn fetch_range(
    pool: &SqlitePool,
    counter: Option<&str>,
    from: i64,
    to: i64,
) -> Result<Vec<TimePoint>, SqliteError> {
    let rows: Vec<(String, i64, f64)> = match counter {
        Some(id) => {
            sqlx::query_as(
                r#"
                SELECT counter_id, timestamp, value
                FROM counter_readings
                WHERE counter_id = ? AND timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp ASC
                "#,
            )
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(
                r#"
                SELECT counter_id, timestamp, value
                FROM counter_readings
                WHERE timestamp >= ? AND timestamp <= ?
                ORDER BY timestamp ASC
                "#,
            )
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows
        .into_iter()
        .map(|(series_key, timestamp, value)| TimePoint {
            series_key,
            timestamp: secs_to_datetime(timestamp),
            value,
        })
        .collect())
}

/// Paris-local daily sums for `[from, to]`
///
/// Fetches raw rows and buckets them client-side so day boundaries follow
/// the Europe/Paris calendar rather than SQLite's UTC date functions.
pub async fn fetch_daily_sums(
    pool: &SqlitePool,
    counter: Option<&str>,
    from: i64,
    to: i64,
) -> Result<Vec<DayBucket>, SqliteError> {
    let points = fetch_range(pool, counter, from, to).await?;
    Ok(bucket::bucket_by_day(&points))
}

/// Paris-local years covered by stored data, as an inclusive range
pub async fn year_range(
    pool: &SqlitePool,
    counter: Option<&str>,
) -> Result<Option<(i32, i32)>, SqliteError> {
    let (min, max): (Option<i64>, Option<i64>) = match counter {
        Some(id) => {
            sqlx::query_as(
                "SELECT MIN(timestamp), MAX(timestamp) FROM counter_readings WHERE counter_id = ?",
            )
            .bind(id)
            .fetch_one(pool)
            .await?
        }
        None => {
            sqlx::query_as("SELECT MIN(timestamp), MAX(timestamp) FROM counter_readings")
                .fetch_one(pool)
                .await?
        }
    };

    Ok(min.zip(max).map(|(min, max)| {
        use chrono::Datelike;
        let first = calendar::paris_date(secs_to_datetime(min)).year();
        let last = calendar::paris_date(secs_to_datetime(max)).year();
        (first, last)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::counters::upsert_counter;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        upsert_counter(&pool, "c1", "Counter 1", 43.61, 3.87, None, 0)
            .await
            .unwrap();
        upsert_counter(&pool, "c2", "Counter 2", 43.62, 3.88, None, 0)
            .await
            .unwrap();
        pool
    }

    fn secs(rfc3339: &str) -> i64 {
        chrono::DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .timestamp()
    }

    #[tokio::test]
    async fn test_insert_readings_ignores_duplicates() {
        let pool = setup_test_pool().await;

        let inserted = insert_readings(&pool, "c1", &[(1000, 5.0), (2000, 7.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        // Overlapping re-ingest: only the new row lands
        let inserted = insert_readings(&pool, "c1", &[(2000, 99.0), (3000, 9.0)])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        // The original value at 2000 is untouched
        let points = fetch_range(&pool, Some("c1"), 0, 10_000).await.unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].value, 7.0);
    }

    #[tokio::test]
    async fn test_insert_readings_empty() {
        let pool = setup_test_pool().await;
        let inserted = insert_readings(&pool, "c1", &[]).await.unwrap();
        assert_eq!(inserted, 0);
    }

    #[tokio::test]
    async fn test_latest_timestamp() {
        let pool = setup_test_pool().await;

        assert_eq!(latest_timestamp(&pool, "c1").await.unwrap(), None);

        insert_readings(&pool, "c1", &[(1000, 5.0), (3000, 7.0)])
            .await
            .unwrap();
        assert_eq!(latest_timestamp(&pool, "c1").await.unwrap(), Some(3000));
        assert_eq!(latest_timestamp(&pool, "c2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_range_filters_and_orders() {
        let pool = setup_test_pool().await;

        insert_readings(&pool, "c1", &[(3000, 3.0), (1000, 1.0), (5000, 5.0)])
            .await
            .unwrap();
        insert_readings(&pool, "c2", &[(2000, 2.0)]).await.unwrap();

        let all = fetch_range(&pool, None, 1000, 3000).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

        let only_c1 = fetch_range(&pool, Some("c1"), 0, 10_000).await.unwrap();
        assert_eq!(only_c1.len(), 3);
        assert!(only_c1.iter().all(|p| p.series_key == "c1"));
    }

    #[tokio::test]
    async fn test_fetch_daily_sums_matches_client_side_bucketing() {
        let pool = setup_test_pool().await;

        // 23:30Z on Jul 1 is already Jul 2 in Paris
        let rows = [
            (secs("2024-07-01T10:00:00Z"), 5.0),
            (secs("2024-07-01T23:30:00Z"), 7.0),
            (secs("2024-07-02T06:00:00Z"), 2.0),
        ];
        insert_readings(&pool, "c1", &rows).await.unwrap();

        let from = secs("2024-07-01T00:00:00Z");
        let to = secs("2024-07-03T00:00:00Z");
        let grouped = fetch_daily_sums(&pool, Some("c1"), from, to).await.unwrap();
        let manual = bucket::bucket_by_day(&fetch_range(&pool, Some("c1"), from, to).await.unwrap());
        assert_eq!(grouped, manual);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].sum, 5.0);
        assert_eq!(grouped[1].sum, 9.0);
    }

    #[tokio::test]
    async fn test_year_range_uses_paris_years() {
        let pool = setup_test_pool().await;

        assert_eq!(year_range(&pool, None).await.unwrap(), None);

        // 23:30Z on New Year's Eve is already the next Paris year
        insert_readings(
            &pool,
            "c1",
            &[
                (secs("2022-06-01T00:00:00Z"), 1.0),
                (secs("2024-12-31T23:30:00Z"), 1.0),
            ],
        )
        .await
        .unwrap();

        assert_eq!(year_range(&pool, None).await.unwrap(), Some((2022, 2025)));
        assert_eq!(year_range(&pool, Some("c2")).await.unwrap(), None);
    }
}
