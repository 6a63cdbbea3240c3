//! This-week-vs-last-week comparison

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use super::bucket;
use super::guard_div;
use super::types::{DayValue, PendingDayValue, WeekComparison};
use crate::data::types::TimePoint;
use crate::domain::calendar;

fn iso_label(monday: NaiveDate) -> String {
    let iso = monday.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

fn day_sum(days: &[bucket::DayBucket], date: NaiveDate) -> f64 {
    days.iter()
        .find(|d| d.date == date)
        .map(|d| d.sum)
        .unwrap_or(0.0)
}

/// In-progress Monday-start week vs the immediately preceding week.
///
/// Days of the current week strictly after today stay `null` rather than
/// zero. Both averages use the zero-is-missing policy of this view: a day
/// counts toward the denominator only if its value is > 0.
pub fn week_comparison(
    current_points: &[TimePoint],
    previous_points: &[TimePoint],
    now: DateTime<Utc>,
) -> WeekComparison {
    let today = calendar::paris_date(now);
    let monday = calendar::week_monday(today);
    let prev_monday = monday - Duration::days(7);

    let current_days = bucket::bucket_by_day(current_points);
    let previous_days = bucket::bucket_by_day(previous_points);

    let current: Vec<PendingDayValue> = (0..7)
        .map(|i| {
            let date = monday + Duration::days(i);
            PendingDayValue {
                day: date,
                value: (date <= today).then(|| day_sum(&current_days, date)),
            }
        })
        .collect();
    let previous: Vec<DayValue> = (0..7)
        .map(|i| {
            let date = prev_monday + Duration::days(i);
            DayValue {
                day: date,
                value: day_sum(&previous_days, date),
            }
        })
        .collect();

    let active_avg = |values: &mut dyn Iterator<Item = f64>| {
        let mut sum = 0.0;
        let mut active = 0_u32;
        for v in values {
            if v > 0.0 {
                sum += v;
                active += 1;
            }
        }
        guard_div(sum, f64::from(active))
    };

    WeekComparison {
        current_label: iso_label(monday),
        previous_label: iso_label(prev_monday),
        current_average: active_avg(&mut current.iter().filter_map(|d| d.value)),
        previous_average: active_avg(&mut previous.iter().map(|d| d.value)),
        current,
        previous,
    }
}
