//! Statistics endpoints
//!
//! Every handler follows the same shape: resolve the requested period to UTC
//! bounds via the calendar, fetch raw points from the store, and hand them to
//! the pure aggregation functions. A failed store fetch degrades to an empty
//! series with a warning, so the dashboard renders an empty chart instead of
//! an error page.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Datelike, Duration, Utc};
use futures::future::join_all;
use serde::Deserialize;

use crate::api::types::{ApiError, parse_date_param};
use crate::data::series::SeriesStore;
use crate::data::types::TimePoint;
use crate::domain::calendar;
use crate::domain::stats::types::{
    DailyYearStats, EvolutionStats, HourlyDistribution, MonthlyStats, WeekComparison, WeekProfile,
    WeekdayTotals, WeekdayWeekendSplit, YearlyProgressStats,
};
use crate::domain::stats::{daily, evolution, hourly, monthly, weekly, yearly};

/// Shared state for statistics endpoints
#[derive(Clone)]
pub struct StatsApiState {
    pub store: Arc<dyn SeriesStore>,
    /// Threshold for the weekday view's zero-run noise filter
    pub zero_run_max_days: usize,
}

/// Build statistics API routes
pub fn routes(store: Arc<dyn SeriesStore>, zero_run_max_days: usize) -> Router<()> {
    let state = StatsApiState {
        store,
        zero_run_max_days,
    };

    Router::new()
        .route("/daily", get(daily_stats))
        .route("/weekdays", get(weekday_stats))
        .route("/weekly", get(weekly_stats))
        .route("/monthly", get(monthly_stats))
        .route("/yearly", get(yearly_stats))
        .route("/evolution", get(evolution_stats))
        .route("/split", get(split_stats))
        .route("/hourly", get(hourly_stats))
        .route("/week-profile", get(week_profile_stats))
        .with_state(state)
}

/// Fetch a range, substituting an empty series on store failure.
async fn fetch_or_empty(
    store: &dyn SeriesStore,
    counter: Option<&str>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<TimePoint> {
    match store.fetch_points(counter, from, to).await {
        Ok(points) => points,
        Err(e) => {
            tracing::warn!(error = %e, "Range fetch failed, serving empty series");
            Vec::new()
        }
    }
}

fn resolve_year(requested: Option<i32>, now: DateTime<Utc>) -> i32 {
    requested.unwrap_or_else(|| calendar::paris_date(now).year())
}

fn year_bounds_checked(year: i32) -> Result<calendar::PeriodBoundary, ApiError> {
    calendar::year_bounds(year)
        .map_err(|e| ApiError::bad_request("INVALID_YEAR", format!("Invalid year {}: {}", year, e)))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
    pub counter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CounterQuery {
    pub counter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub counter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HourlyQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub counter: Option<String>,
    /// "weekday" or "weekend"; absent means all days
    pub days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
    pub counter: Option<String>,
}

/// Daily totals for a calendar year
#[utoipa::path(
    get,
    path = "/api/v1/stats/daily",
    tag = "stats",
    params(
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to the current Paris year"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Daily totals with averages and max day", body = DailyYearStats),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn daily_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<DailyYearStats>, ApiError> {
    let now = Utc::now();
    let year = resolve_year(query.year, now);
    let bounds = year_bounds_checked(year)?;

    let points = fetch_or_empty(
        state.store.as_ref(),
        query.counter.as_deref(),
        bounds.start_utc,
        bounds.end_utc,
    )
    .await;

    Ok(Json(daily::daily_for_year(&points, year, now)))
}

/// Per-weekday totals for a calendar year, noise-filtered
#[utoipa::path(
    get,
    path = "/api/v1/stats/weekdays",
    tag = "stats",
    params(
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to the current Paris year"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Weekday totals in Monday-first order", body = WeekdayTotals),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn weekday_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<WeekdayTotals>, ApiError> {
    let now = Utc::now();
    let year = resolve_year(query.year, now);
    let bounds = year_bounds_checked(year)?;

    let points = fetch_or_empty(
        state.store.as_ref(),
        query.counter.as_deref(),
        bounds.start_utc,
        bounds.end_utc,
    )
    .await;

    Ok(Json(daily::weekday_totals(
        &points,
        year,
        state.zero_run_max_days,
    )))
}

/// Current week vs the preceding week
#[utoipa::path(
    get,
    path = "/api/v1/stats/weekly",
    tag = "stats",
    params(
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Week-over-week comparison", body = WeekComparison)
    )
)]
pub async fn weekly_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<CounterQuery>,
) -> Json<WeekComparison> {
    let now = Utc::now();
    let today = calendar::paris_date(now);
    let current = calendar::week_bounds(today);
    let previous = calendar::week_bounds(today - Duration::days(7));

    let counter = query.counter.as_deref();
    let (current_points, previous_points) = tokio::join!(
        fetch_or_empty(
            state.store.as_ref(),
            counter,
            current.start_utc,
            current.end_utc
        ),
        fetch_or_empty(
            state.store.as_ref(),
            counter,
            previous.start_utc,
            previous.end_utc
        ),
    );

    Json(weekly::week_comparison(
        &current_points,
        &previous_points,
        now,
    ))
}

/// Month totals for a calendar year
#[utoipa::path(
    get,
    path = "/api/v1/stats/monthly",
    tag = "stats",
    params(
        ("year" = Option<i32>, Query, description = "Calendar year, defaults to the current Paris year"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Monthly rollup, elapsed months only", body = MonthlyStats),
        (status = 400, description = "Invalid year")
    )
)]
pub async fn monthly_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<MonthlyStats>, ApiError> {
    let now = Utc::now();
    let year = resolve_year(query.year, now);
    let bounds = year_bounds_checked(year)?;

    let points = fetch_or_empty(
        state.store.as_ref(),
        query.counter.as_deref(),
        bounds.start_utc,
        bounds.end_utc,
    )
    .await;

    Ok(Json(monthly::monthly_for_year(&points, year, now)))
}

/// Year-to-date position of every year with data
#[utoipa::path(
    get,
    path = "/api/v1/stats/yearly",
    tag = "stats",
    params(
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Per-year progress since first data", body = YearlyProgressStats)
    )
)]
pub async fn yearly_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<CounterQuery>,
) -> Json<YearlyProgressStats> {
    let now = Utc::now();
    let counter = query.counter.as_deref();

    let range = match state.store.year_range(counter).await {
        Ok(range) => range,
        Err(e) => {
            tracing::warn!(error = %e, "Year range fetch failed, serving empty series");
            None
        }
    };
    let Some((first, last)) = range else {
        return Json(yearly::yearly_progress(&[], now));
    };

    let store = state.store.as_ref();
    let fetches = (first..=last).map(|year| async move {
        let points = match calendar::year_bounds(year) {
            Ok(bounds) => fetch_or_empty(store, counter, bounds.start_utc, bounds.end_utc).await,
            Err(e) => {
                tracing::warn!(year, error = %e, "Unresolvable year, serving empty series");
                Vec::new()
            }
        };
        (year, points)
    });
    let years: Vec<(i32, Vec<TimePoint>)> = join_all(fetches).await;

    Json(yearly::yearly_progress(&years, now))
}

/// A date range vs the same range one year earlier
#[utoipa::path(
    get,
    path = "/api/v1/stats/evolution",
    tag = "stats",
    params(
        ("from" = String, Query, description = "Range start, YYYY-MM-DD (Paris-local)"),
        ("to" = String, Query, description = "Range end, YYYY-MM-DD (Paris-local, inclusive)"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Index-aligned series with totals and change", body = EvolutionStats),
        (status = 400, description = "Missing or malformed date")
    )
)]
pub async fn evolution_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<EvolutionStats>, ApiError> {
    let from = parse_date_param(&query.from, "from")?;
    let to = parse_date_param(&query.to, "to")?;
    let ref_from = evolution::one_year_earlier(from);
    let ref_to = evolution::one_year_earlier(to);

    let counter = query.counter.as_deref();
    let (current_points, reference_points) = tokio::join!(
        fetch_or_empty(
            state.store.as_ref(),
            counter,
            calendar::day_start(from),
            calendar::day_end(to)
        ),
        fetch_or_empty(
            state.store.as_ref(),
            counter,
            calendar::day_start(ref_from),
            calendar::day_end(ref_to)
        ),
    );

    Ok(Json(evolution::evolution(
        &current_points,
        &reference_points,
        from,
        to,
    )))
}

/// Weekday vs weekend totals over a date range
#[utoipa::path(
    get,
    path = "/api/v1/stats/split",
    tag = "stats",
    params(
        ("from" = String, Query, description = "Range start, YYYY-MM-DD (Paris-local)"),
        ("to" = String, Query, description = "Range end, YYYY-MM-DD (Paris-local, inclusive)"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "Mon-Fri vs Sat-Sun group statistics", body = WeekdayWeekendSplit),
        (status = 400, description = "Missing or malformed date")
    )
)]
pub async fn split_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<WeekdayWeekendSplit>, ApiError> {
    let from = parse_date_param(&query.from, "from")?;
    let to = parse_date_param(&query.to, "to")?;

    // Day granularity is enough here, so use the store's grouped fetch
    let days = match state
        .store
        .fetch_day_sums(
            query.counter.as_deref(),
            calendar::day_start(from),
            calendar::day_end(to),
        )
        .await
    {
        Ok(days) => days,
        Err(e) => {
            tracing::warn!(error = %e, "Day-sum fetch failed, serving empty series");
            Vec::new()
        }
    };

    Ok(Json(evolution::weekday_weekend_split(&days, from, to)))
}

/// Hour-of-day distribution over a date range
#[utoipa::path(
    get,
    path = "/api/v1/stats/hourly",
    tag = "stats",
    params(
        ("from" = String, Query, description = "Range start, YYYY-MM-DD (Paris-local)"),
        ("to" = String, Query, description = "Range end, YYYY-MM-DD (Paris-local, inclusive)"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters"),
        ("days" = Option<String>, Query, description = "Restrict to \"weekday\" or \"weekend\"")
    ),
    responses(
        (status = 200, description = "Non-zero hours with percentage shares", body = HourlyDistribution),
        (status = 400, description = "Missing or malformed parameter")
    )
)]
pub async fn hourly_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<HourlyQuery>,
) -> Result<Json<HourlyDistribution>, ApiError> {
    let from = parse_date_param(&query.from, "from")?;
    let to = parse_date_param(&query.to, "to")?;
    let day_class = query
        .days
        .as_deref()
        .map(str::parse::<hourly::DayClass>)
        .transpose()
        .map_err(|msg| ApiError::bad_request("INVALID_DAY_CLASS", msg))?;

    let points = fetch_or_empty(
        state.store.as_ref(),
        query.counter.as_deref(),
        calendar::day_start(from),
        calendar::day_end(to),
    )
    .await;

    Ok(Json(hourly::hourly_distribution(&points, day_class)))
}

/// Weekday x hour profile for one ISO week
#[utoipa::path(
    get,
    path = "/api/v1/stats/week-profile",
    tag = "stats",
    params(
        ("year" = Option<i32>, Query, description = "ISO week-year, defaults to the current one"),
        ("week" = Option<u32>, Query, description = "ISO week number, defaults to the current one"),
        ("counter" = Option<String>, Query, description = "Counter id, omitted means all counters")
    ),
    responses(
        (status = 200, description = "7x24 hour grid plus the navigable year range", body = WeekProfile),
        (status = 400, description = "Unresolvable year/week combination")
    )
)]
pub async fn week_profile_stats(
    State(state): State<StatsApiState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekProfile>, ApiError> {
    let now = Utc::now();
    let year = query.year.unwrap_or_else(|| calendar::iso_week_year(now));
    let week = query.week.unwrap_or_else(|| calendar::iso_week_number(now));

    let start = calendar::week_start_date(year, week).map_err(|e| {
        ApiError::bad_request("INVALID_WEEK", format!("Invalid week {}-W{}: {}", year, week, e))
    })?;
    let end = calendar::end_of_week_paris(start);

    let counter = query.counter.as_deref();
    let (points, year_range) = tokio::join!(
        fetch_or_empty(state.store.as_ref(), counter, start, end),
        state.store.year_range(counter),
    );
    let year_range = year_range.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Year range fetch failed, navigation disabled");
        None
    });

    Ok(Json(hourly::week_profile(&points, year, week, year_range)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::data::sqlite::SqliteError;
    use crate::data::types::CounterRow;

    /// In-memory store; `fail` simulates a broken database.
    struct FakeStore {
        points: Vec<TimePoint>,
        years: Option<(i32, i32)>,
        fail: bool,
    }

    #[async_trait]
    impl SeriesStore for FakeStore {
        async fn fetch_points(
            &self,
            counter: Option<&str>,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<TimePoint>, SqliteError> {
            if self.fail {
                return Err(SqliteError::Io(std::io::Error::other("store offline")));
            }
            Ok(self
                .points
                .iter()
                .filter(|p| p.timestamp >= from && p.timestamp <= to)
                .filter(|p| counter.is_none_or(|c| p.series_key == c))
                .cloned()
                .collect())
        }

        async fn fetch_day_sums(
            &self,
            counter: Option<&str>,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<crate::domain::stats::bucket::DayBucket>, SqliteError> {
            let points = self.fetch_points(counter, from, to).await?;
            Ok(crate::domain::stats::bucket::bucket_by_day(&points))
        }

        async fn year_range(
            &self,
            _counter: Option<&str>,
        ) -> Result<Option<(i32, i32)>, SqliteError> {
            if self.fail {
                return Err(SqliteError::Io(std::io::Error::other("store offline")));
            }
            Ok(self.years)
        }

        async fn list_counters(&self) -> Result<Vec<CounterRow>, SqliteError> {
            Ok(Vec::new())
        }
    }

    fn state_with(store: FakeStore) -> StatsApiState {
        StatsApiState {
            store: Arc::new(store),
            zero_run_max_days: 2,
        }
    }

    fn point(counter: &str, ts: &str, value: f64) -> TimePoint {
        TimePoint {
            series_key: counter.to_string(),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc),
            value,
        }
    }

    #[tokio::test]
    async fn test_daily_failed_store_serves_empty_chart() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: true,
        });
        let Json(stats) = daily_stats(
            State(state),
            Query(YearQuery {
                year: Some(2024),
                counter: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(stats.year, 2024);
        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.max_day, None);
        assert!(stats.days.iter().all(|d| d.value == 0.0));
    }

    #[tokio::test]
    async fn test_daily_sums_by_paris_day() {
        let state = state_with(FakeStore {
            points: vec![
                point("c1", "2024-06-15T08:00:00Z", 10.0),
                point("c1", "2024-06-15T17:00:00Z", 5.0),
                point("c2", "2024-06-15T09:00:00Z", 3.0),
            ],
            years: Some((2024, 2024)),
            fail: false,
        });
        let Json(stats) = daily_stats(
            State(state),
            Query(YearQuery {
                year: Some(2024),
                counter: None,
            }),
        )
        .await
        .unwrap();

        let day = stats
            .days
            .iter()
            .find(|d| d.day == "2024-06-15".parse().unwrap())
            .unwrap();
        assert_eq!(day.value, 18.0);
    }

    #[tokio::test]
    async fn test_daily_counter_filter() {
        let state = state_with(FakeStore {
            points: vec![
                point("c1", "2024-06-15T08:00:00Z", 10.0),
                point("c2", "2024-06-15T09:00:00Z", 3.0),
            ],
            years: Some((2024, 2024)),
            fail: false,
        });
        let Json(stats) = daily_stats(
            State(state),
            Query(YearQuery {
                year: Some(2024),
                counter: Some("c2".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(stats.total, 3.0);
    }

    #[tokio::test]
    async fn test_evolution_requires_range() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: false,
        });
        let err = evolution_stats(
            State(state),
            Query(RangeQuery {
                from: None,
                to: Some("2024-06-30".to_string()),
                counter: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_split_all_weekdays() {
        // Mon 2024-06-10 .. Fri 2024-06-14, 30 per day
        let points: Vec<TimePoint> = (10..15)
            .map(|d| point("c1", &format!("2024-06-{}T10:00:00Z", d), 30.0))
            .collect();
        let state = state_with(FakeStore {
            points,
            years: Some((2024, 2024)),
            fail: false,
        });
        let Json(split) = split_stats(
            State(state),
            Query(RangeQuery {
                from: Some("2024-06-10".to_string()),
                to: Some("2024-06-14".to_string()),
                counter: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(split.weekday.total, 150.0);
        assert_eq!(split.weekday.count, 5);
        assert_eq!(split.weekday.average, 30.0);
        assert_eq!(split.weekend.total, 0.0);
        assert_eq!(split.weekend.count, 0);
        assert_eq!(split.weekend.average, 0.0);
    }

    #[tokio::test]
    async fn test_split_failed_store_serves_zero_groups() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: true,
        });
        let Json(split) = split_stats(
            State(state),
            Query(RangeQuery {
                from: Some("2024-06-10".to_string()),
                to: Some("2024-06-16".to_string()),
                counter: None,
            }),
        )
        .await
        .unwrap();

        // Empty data still yields the full calendar-day counts
        assert_eq!(split.weekday.count, 5);
        assert_eq!(split.weekend.count, 2);
        assert_eq!(split.weekday.total, 0.0);
        assert_eq!(split.weekend.average, 0.0);
    }

    #[tokio::test]
    async fn test_hourly_rejects_unknown_day_class() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: false,
        });
        let err = hourly_stats(
            State(state),
            Query(HourlyQuery {
                from: Some("2024-06-01".to_string()),
                to: Some("2024-06-30".to_string()),
                counter: None,
                days: Some("holidays".to_string()),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_hourly_drops_zero_hours() {
        let state = state_with(FakeStore {
            points: vec![
                point("c1", "2024-06-15T08:00:00Z", 30.0),
                point("c1", "2024-06-15T15:00:00Z", 10.0),
            ],
            years: Some((2024, 2024)),
            fail: false,
        });
        let Json(dist) = hourly_stats(
            State(state),
            Query(HourlyQuery {
                from: Some("2024-06-15".to_string()),
                to: Some("2024-06-15".to_string()),
                counter: None,
                days: None,
            }),
        )
        .await
        .unwrap();

        // 08:00Z and 15:00Z are 10h and 17h Paris in summer
        assert_eq!(dist.hours.len(), 2);
        assert_eq!(dist.hours[0].hour, 10);
        assert_eq!(dist.hours[0].share, 75.0);
        assert_eq!(dist.hours[1].hour, 17);
        assert_eq!(dist.hours[1].share, 25.0);
    }

    #[tokio::test]
    async fn test_yearly_failed_store_serves_empty() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: true,
        });
        let Json(stats) = yearly_stats(State(state), Query(CounterQuery { counter: None })).await;
        assert!(stats.years.is_empty());
    }

    #[tokio::test]
    async fn test_week_profile_places_points_in_grid() {
        // 2024-W24: Mon 2024-06-10 .. Sun 2024-06-16
        let state = state_with(FakeStore {
            points: vec![point("c1", "2024-06-12T06:00:00Z", 40.0)],
            years: Some((2023, 2024)),
            fail: false,
        });
        let Json(profile) = week_profile_stats(
            State(state),
            Query(WeekQuery {
                year: Some(2024),
                week: Some(24),
                counter: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(profile.year, 2024);
        assert_eq!(profile.week, 24);
        // Wednesday 08h Paris
        assert_eq!(profile.days.wednesday[8], 40.0);
        assert_eq!(profile.first_year, Some(2023));
        assert_eq!(profile.last_year, Some(2024));
    }

    #[tokio::test]
    async fn test_week_profile_rejects_week_zero() {
        let state = state_with(FakeStore {
            points: vec![],
            years: None,
            fail: false,
        });
        let err = week_profile_stats(
            State(state),
            Query(WeekQuery {
                year: Some(2024),
                week: Some(0),
                counter: None,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[test]
    fn test_resolve_year_uses_paris_calendar() {
        // 23:30 UTC on Dec 31 is already Jan 1 in Paris
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(resolve_year(None, now), 2025);
        assert_eq!(resolve_year(Some(2022), now), 2022);
    }
}
