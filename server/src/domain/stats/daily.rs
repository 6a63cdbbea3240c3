//! Daily rollups for a calendar year

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

use super::bucket::{self, DayBucket};
use super::guard_div;
use super::types::{DailyYearStats, DayValue, WeekdayTotal, WeekdayTotals, weekday_name};
use crate::data::types::TimePoint;
use crate::domain::calendar;

/// Default zero-run threshold for noise filtering; overridable through
/// `stats.zero_run_max_days` in the config.
pub const DEFAULT_ZERO_RUN_MAX_DAYS: usize = 2;

fn year_spine_joined(points: &[TimePoint], year: i32) -> Vec<DayBucket> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1);
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31);
    let (Some(jan1), Some(dec31)) = (jan1, dec31) else {
        return Vec::new();
    };
    let spine = calendar::day_spine(jan1, dec31);
    bucket::left_join_spine(&spine, &bucket::bucket_by_day(points))
}

/// Daily totals for `year` with trailing exclusion: only fully-elapsed
/// Paris-local days are reported, i.e. everything from today onward is cut.
pub fn daily_for_year(points: &[TimePoint], year: i32, now: DateTime<Utc>) -> DailyYearStats {
    let today = calendar::paris_date(now);
    let elapsed: Vec<DayBucket> = year_spine_joined(points, year)
        .into_iter()
        .filter(|d| d.date < today)
        .collect();

    let total: f64 = elapsed.iter().map(|d| d.sum).sum();
    let active_days = elapsed.iter().filter(|d| d.sum > 0.0).count();
    let max_day = bucket::max_bucket(&elapsed)
        .filter(|d| d.sum > 0.0)
        .map(|d| DayValue {
            day: d.date,
            value: d.sum,
        });

    DailyYearStats {
        year,
        global_average: guard_div(total, elapsed.len() as f64),
        active_days_average: guard_div(total, active_days as f64),
        days: elapsed
            .into_iter()
            .map(|d| DayValue {
                day: d.date,
                value: d.sum,
            })
            .collect(),
        total,
        max_day,
    }
}

/// Per-weekday totals over the full-year spine with zero-run noise
/// filtering (`max_run`, see [`bucket::filter_consecutive_zero_runs`]).
///
/// Averages count only days with value > 0; all-zero days that survive the
/// filter still show up in `filtered_days` for transparency.
pub fn weekday_totals(points: &[TimePoint], year: i32, max_run: usize) -> WeekdayTotals {
    let joined = year_spine_joined(points, year);
    let filtered = bucket::filter_consecutive_zero_runs(&joined, max_run);

    let mut totals = [0.0_f64; 7];
    let mut counts = [0_u32; 7];
    for day in &filtered {
        if day.sum > 0.0 {
            let idx = day.date.weekday().num_days_from_monday() as usize;
            totals[idx] += day.sum;
            counts[idx] += 1;
        }
    }

    const ORDER: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
    WeekdayTotals {
        weekdays: ORDER
            .into_iter()
            .map(|wd| {
                let idx = wd.num_days_from_monday() as usize;
                WeekdayTotal {
                    weekday: weekday_name(wd),
                    total: totals[idx],
                    count: counts[idx],
                    average: guard_div(totals[idx], f64::from(counts[idx])),
                }
            })
            .collect(),
        original_days: joined.len(),
        filtered_days: filtered.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn point(ts: &str, value: f64) -> TimePoint {
        TimePoint {
            series_key: "c1".to_string(),
            timestamp: utc(ts),
            value,
        }
    }

    #[test]
    fn test_daily_excludes_today_onward() {
        let points = vec![
            point("2024-06-13T10:00:00Z", 10.0),
            point("2024-06-14T10:00:00Z", 20.0),
            point("2024-06-15T10:00:00Z", 99.0), // today, excluded
        ];
        let stats = daily_for_year(&points, 2024, utc("2024-06-15T12:00:00Z"));
        // Jan 1 .. Jun 14 = 166 days in a leap year
        assert_eq!(stats.days.len(), 166);
        assert_eq!(stats.total, 30.0);
        assert_eq!(stats.max_day.as_ref().unwrap().value, 20.0);
        assert!((stats.global_average - 30.0 / 166.0).abs() < 1e-9);
        assert_eq!(stats.active_days_average, 15.0);
    }

    #[test]
    fn test_daily_past_year_full_spine() {
        let stats = daily_for_year(&[], 2023, utc("2024-06-15T12:00:00Z"));
        assert_eq!(stats.days.len(), 365);
        assert_eq!(stats.total, 0.0);
        assert_eq!(stats.global_average, 0.0);
        assert_eq!(stats.active_days_average, 0.0);
        assert!(stats.max_day.is_none());
    }

    #[test]
    fn test_daily_future_year_empty() {
        let stats = daily_for_year(&[], 2030, utc("2024-06-15T12:00:00Z"));
        assert!(stats.days.is_empty());
        assert_eq!(stats.global_average, 0.0);
    }

    #[test]
    fn test_weekday_totals_skip_zero_days_in_average() {
        // Two Mondays with data, the rest of the year is zero and mostly
        // filtered out as long runs.
        let points = vec![
            point("2024-06-10T10:00:00Z", 10.0), // Monday
            point("2024-06-17T10:00:00Z", 30.0), // Monday
        ];
        let stats = weekday_totals(&points, 2024, 2);
        let monday = &stats.weekdays[0];
        assert_eq!(monday.weekday, "monday");
        assert_eq!(monday.total, 40.0);
        assert_eq!(monday.count, 2);
        assert_eq!(monday.average, 20.0);
        // Other weekdays report zero, not NaN
        assert_eq!(stats.weekdays[6].average, 0.0);
        assert_eq!(stats.original_days, 366);
        assert!(stats.filtered_days < stats.original_days);
    }

    #[test]
    fn test_weekday_totals_fixed_order() {
        let stats = weekday_totals(&[], 2024, 2);
        let names: Vec<_> = stats.weekdays.iter().map(|w| w.weekday).collect();
        assert_eq!(
            names,
            vec![
                "monday",
                "tuesday",
                "wednesday",
                "thursday",
                "friday",
                "saturday",
                "sunday"
            ]
        );
    }
}
