//! Counter metadata repository

use sqlx::SqlitePool;

use crate::core::constants::COUNTER_INACTIVE_AFTER_SECS;
use crate::data::sqlite::SqliteError;
use crate::data::types::CounterRow;

/// Insert or refresh a counter's metadata (idempotent)
///
/// `first_seen` is preserved on conflict; `last_seen` and the descriptive
/// fields are always updated from the latest catalogue snapshot.
pub async fn upsert_counter(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    latitude: f64,
    longitude: f64,
    serial: Option<&str>,
    observed_at: i64,
) -> Result<(), SqliteError> {
    sqlx::query(
        r#"
        INSERT INTO counters (id, name, latitude, longitude, serial, active, first_seen, last_seen)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            name = excluded.name,
            latitude = excluded.latitude,
            longitude = excluded.longitude,
            serial = excluded.serial,
            active = 1,
            last_seen = excluded.last_seen
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(latitude)
    .bind(longitude)
    .bind(serial)
    .bind(observed_at)
    .bind(observed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// List all counters ordered by name
pub async fn list_counters(pool: &SqlitePool) -> Result<Vec<CounterRow>, SqliteError> {
    let rows: Vec<(String, String, f64, f64, Option<String>, bool, i64, i64)> = sqlx::query_as(
        r#"
        SELECT id, name, latitude, longitude, serial, active, first_seen, last_seen
        FROM counters
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(
            |(id, name, latitude, longitude, serial, active, first_seen, last_seen)| CounterRow {
                id,
                name,
                latitude,
                longitude,
                serial,
                active,
                first_seen,
                last_seen,
            },
        )
        .collect())
}

/// Check whether a counter exists
pub async fn counter_exists(pool: &SqlitePool, id: &str) -> Result<bool, SqliteError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM counters WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Mark counters inactive when absent from the catalogue for too long
///
/// Returns the number of counters newly flagged.
pub async fn mark_stale_inactive(pool: &SqlitePool, now: i64) -> Result<u64, SqliteError> {
    let cutoff = now - COUNTER_INACTIVE_AFTER_SECS;

    let result = sqlx::query("UPDATE counters SET active = 0 WHERE active = 1 AND last_seen < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
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
    async fn test_upsert_counter_insert_then_update() {
        let pool = setup_test_pool().await;

        upsert_counter(&pool, "X1", "Albert 1er", 43.61, 3.87, None, 1000)
            .await
            .unwrap();
        upsert_counter(&pool, "X1", "Albert 1er vers plage", 43.62, 3.88, Some("S1"), 2000)
            .await
            .unwrap();

        let counters = list_counters(&pool).await.unwrap();
        assert_eq!(counters.len(), 1);
        let c = &counters[0];
        assert_eq!(c.name, "Albert 1er vers plage");
        assert_eq!(c.serial.as_deref(), Some("S1"));
        assert_eq!(c.first_seen, 1000);
        assert_eq!(c.last_seen, 2000);
        assert!(c.active);
    }

    #[tokio::test]
    async fn test_list_counters_ordered_by_name() {
        let pool = setup_test_pool().await;

        upsert_counter(&pool, "B", "Zola", 43.6, 3.8, None, 0)
            .await
            .unwrap();
        upsert_counter(&pool, "A", "Antigone", 43.6, 3.8, None, 0)
            .await
            .unwrap();

        let counters = list_counters(&pool).await.unwrap();
        assert_eq!(counters[0].name, "Antigone");
        assert_eq!(counters[1].name, "Zola");
    }

    #[tokio::test]
    async fn test_counter_exists() {
        let pool = setup_test_pool().await;

        upsert_counter(&pool, "X1", "Albert 1er", 43.61, 3.87, None, 0)
            .await
            .unwrap();

        assert!(counter_exists(&pool, "X1").await.unwrap());
        assert!(!counter_exists(&pool, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_stale_inactive() {
        let pool = setup_test_pool().await;

        let now = 10_000_000;
        upsert_counter(&pool, "old", "Old", 43.6, 3.8, None, now - COUNTER_INACTIVE_AFTER_SECS - 1)
            .await
            .unwrap();
        upsert_counter(&pool, "fresh", "Fresh", 43.6, 3.8, None, now)
            .await
            .unwrap();

        let flagged = mark_stale_inactive(&pool, now).await.unwrap();
        assert_eq!(flagged, 1);

        let counters = list_counters(&pool).await.unwrap();
        let old = counters.iter().find(|c| c.id == "old").unwrap();
        let fresh = counters.iter().find(|c| c.id == "fresh").unwrap();
        assert!(!old.active);
        assert!(fresh.active);

        // Re-running flags nothing new
        let flagged = mark_stale_inactive(&pool, now).await.unwrap();
        assert_eq!(flagged, 0);
    }
}
