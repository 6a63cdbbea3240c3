//! SeriesStore trait implementation for SQLite
//!
//! The statistics routes depend on this trait rather than on the pool
//! directly, so handler logic can be exercised against an in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::sqlite::repositories::{counters, readings};
use crate::data::sqlite::{SqliteError, SqliteService};
use crate::data::types::{CounterRow, TimePoint};
use crate::domain::stats::bucket::DayBucket;

/// Read access to counter metadata and raw reading series
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Raw points in `[from, to]`, ascending; `counter` narrows to one series
    async fn fetch_points(
        &self,
        counter: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimePoint>, SqliteError>;

    /// Paris-local daily sums over `[from, to]`, grouped by the same
    /// calendar the client-side bucketer uses
    async fn fetch_day_sums(
        &self,
        counter: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayBucket>, SqliteError>;

    /// Inclusive range of Paris-local years with stored data
    async fn year_range(&self, counter: Option<&str>) -> Result<Option<(i32, i32)>, SqliteError>;

    async fn list_counters(&self) -> Result<Vec<CounterRow>, SqliteError>;
}

#[async_trait]
impl SeriesStore for Arc<SqliteService> {
    async fn fetch_points(
        &self,
        counter: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimePoint>, SqliteError> {
        readings::fetch_range(self.pool(), counter, from.timestamp(), to.timestamp()).await
    }

    async fn fetch_day_sums(
        &self,
        counter: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DayBucket>, SqliteError> {
        readings::fetch_daily_sums(self.pool(), counter, from.timestamp(), to.timestamp()).await
    }

    async fn year_range(&self, counter: Option<&str>) -> Result<Option<(i32, i32)>, SqliteError> {
        readings::year_range(self.pool(), counter).await
    }

    async fn list_counters(&self) -> Result<Vec<CounterRow>, SqliteError> {
        counters::list_counters(self.pool()).await
    }
}
