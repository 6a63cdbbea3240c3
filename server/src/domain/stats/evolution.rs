//! Year-over-year evolution and weekday/weekend split

use chrono::{Datelike, NaiveDate, Weekday};

use super::bucket;
use super::guard_div;
use super::types::{DayValue, EvolutionStats, GroupStat, WeekdayWeekendSplit};
use crate::data::types::TimePoint;
use crate::domain::calendar;

/// Shift a date exactly one calendar year back. Feb 29 rolls over to
/// Mar 1 of the previous year, matching date rollover semantics; the
/// comparison series are aligned by index downstream, so the day-count
/// mismatch around leap days is tolerated by design.
pub fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - 1, date.month(), date.day())
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(date.year() - 1, 3, 1).unwrap())
}

fn spine_values(points: &[TimePoint], from: NaiveDate, to: NaiveDate) -> Vec<DayValue> {
    let spine = calendar::day_spine(from, to);
    bucket::left_join_spine(&spine, &bucket::bucket_by_day(points))
        .into_iter()
        .map(|d| DayValue {
            day: d.date,
            value: d.sum,
        })
        .collect()
}

/// Current `[from, to]` range vs the same range one year earlier.
///
/// Both series are spine-joined (missing days are 0) and truncated to the
/// shorter length so charts can align them by index.
pub fn evolution(
    current_points: &[TimePoint],
    reference_points: &[TimePoint],
    from: NaiveDate,
    to: NaiveDate,
) -> EvolutionStats {
    let mut current = spine_values(current_points, from, to);
    let mut reference =
        spine_values(reference_points, one_year_earlier(from), one_year_earlier(to));

    let len = current.len().min(reference.len());
    current.truncate(len);
    reference.truncate(len);

    let current_total: f64 = current.iter().map(|d| d.value).sum();
    let reference_total: f64 = reference.iter().map(|d| d.value).sum();

    EvolutionStats {
        current,
        reference,
        current_total,
        reference_total,
        change_pct: guard_div((current_total - reference_total) * 100.0, reference_total),
    }
}

/// Partition the range's calendar days into Mon-Fri and Sat-Sun groups.
///
/// Input is pre-bucketed daily sums, either the store's grouped fetch or
/// [`bucket::bucket_by_day`]; both go through the same calendar. `count` is
/// the number of calendar days in the group, data or not; a group with no
/// days reports average 0, never NaN.
pub fn weekday_weekend_split(
    days: &[bucket::DayBucket],
    from: NaiveDate,
    to: NaiveDate,
) -> WeekdayWeekendSplit {
    let spine = calendar::day_spine(from, to);
    let joined = bucket::left_join_spine(&spine, days);

    let group = |weekend: bool| {
        let days = joined.iter().filter(|d| {
            matches!(d.date.weekday(), Weekday::Sat | Weekday::Sun) == weekend
        });
        let mut total = 0.0;
        let mut count = 0_u32;
        for d in days {
            total += d.sum;
            count += 1;
        }
        GroupStat {
            total,
            count,
            average: guard_div(total, f64::from(count)).round(),
        }
    };

    WeekdayWeekendSplit {
        weekday: group(false),
        weekend: group(true),
    }
}
