//! Bucket aggregation over raw time points
//!
//! Reduces (timestamp, value) sequences into Paris-local calendar buckets.
//! All grouping goes through [`crate::domain::calendar`]; no timezone
//! arithmetic happens here. Accumulation is plain floating addition, no
//! rounding; consumers decide how to round averages.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Weekday};

use crate::data::types::TimePoint;
use crate::domain::calendar;

/// Aggregate for one Paris-local calendar unit (day, week start, or month
/// start depending on the producer).
///
/// `count` is the number of raw points that contributed; comparative views
/// that re-aggregate buckets document their own count semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub sum: f64,
    pub count: u32,
}

impl DayBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            sum: 0.0,
            count: 0,
        }
    }
}

/// Aggregate for one Paris-local hour of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourBucket {
    pub hour: u32,
    pub sum: f64,
    pub count: u32,
}

/// 7x24 cross-tabulation of Paris-local weekday x hour-of-day sums,
/// zero-filled, ISO Monday-first.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayHourGrid {
    sums: [[f64; 24]; 7],
}

impl WeekdayHourGrid {
    pub fn sum(&self, weekday: Weekday, hour: u32) -> f64 {
        self.sums[weekday.num_days_from_monday() as usize][hour as usize % 24]
    }

    /// Hour sums for one weekday, index 0 = midnight.
    pub fn row(&self, weekday: Weekday) -> &[f64; 24] {
        &self.sums[weekday.num_days_from_monday() as usize]
    }
}

impl Default for WeekdayHourGrid {
    fn default() -> Self {
        Self {
            sums: [[0.0; 24]; 7],
        }
    }
}

fn bucket_by_date_key(
    points: &[TimePoint],
    key: impl Fn(&TimePoint) -> NaiveDate,
) -> Vec<DayBucket> {
    let mut map: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for p in points {
        let entry = map.entry(key(p)).or_insert((0.0, 0));
        entry.0 += p.value;
        entry.1 += 1;
    }
    map.into_iter()
        .map(|(date, (sum, count))| DayBucket { date, sum, count })
        .collect()
}

/// Group by Paris-local calendar day, ascending. Days with no points are not
/// synthesized; callers needing full coverage left-join a spine
/// ([`left_join_spine`]).
pub fn bucket_by_day(points: &[TimePoint]) -> Vec<DayBucket> {
    bucket_by_date_key(points, |p| calendar::paris_date(p.timestamp))
}

/// Group by Monday-start week, keyed by the week's Monday.
pub fn bucket_by_week(points: &[TimePoint]) -> Vec<DayBucket> {
    bucket_by_date_key(points, |p| {
        calendar::week_monday(calendar::paris_date(p.timestamp))
    })
}

/// Group by calendar month, keyed by the first of the month.
pub fn bucket_by_month(points: &[TimePoint]) -> Vec<DayBucket> {
    bucket_by_date_key(points, |p| {
        calendar::month_first(calendar::paris_date(p.timestamp))
    })
}

/// Group by Paris-local hour of day. Always exactly 24 entries; hours with
/// no data keep sum 0.
pub fn bucket_by_hour_of_day(points: &[TimePoint]) -> Vec<HourBucket> {
    let mut hours: Vec<HourBucket> = (0..24)
        .map(|hour| HourBucket {
            hour,
            sum: 0.0,
            count: 0,
        })
        .collect();
    for p in points {
        let h = calendar::paris_hour(p.timestamp) as usize;
        hours[h].sum += p.value;
        hours[h].count += 1;
    }
    hours
}

/// Cross-tabulate Paris-local weekday x hour of day. All 168 cells present.
pub fn bucket_by_day_of_week(points: &[TimePoint]) -> WeekdayHourGrid {
    let mut grid = WeekdayHourGrid::default();
    for p in points {
        let d = calendar::paris_weekday(p.timestamp).num_days_from_monday() as usize;
        let h = calendar::paris_hour(p.timestamp) as usize;
        grid.sums[d][h] += p.value;
    }
    grid
}

/// Drop maximal runs of consecutive zero-sum days strictly longer than
/// `max_run`; shorter runs are kept as-is.
///
/// Distinguishes genuine short gaps (weekends, brief maintenance) from long
/// dead periods (decommissioned sensor) that would skew averages. A run
/// split by a single non-zero day counts as two separate runs. Trailing
/// runs are subject to the same rule.
pub fn filter_consecutive_zero_runs(days: &[DayBucket], max_run: usize) -> Vec<DayBucket> {
    let mut out = Vec::with_capacity(days.len());
    let mut run: Vec<DayBucket> = Vec::new();
    for day in days {
        if day.sum == 0.0 {
            run.push(day.clone());
        } else {
            if run.len() <= max_run {
                out.append(&mut run);
            } else {
                run.clear();
            }
            out.push(day.clone());
        }
    }
    if run.len() <= max_run {
        out.append(&mut run);
    }
    out
}

/// The bucket with the largest sum; ties go to the earliest date.
///
/// Input is expected date-ascending, as produced by the bucketers.
pub fn max_bucket(days: &[DayBucket]) -> Option<&DayBucket> {
    let mut best: Option<&DayBucket> = None;
    for day in days {
        match best {
            Some(b) if day.sum <= b.sum => {}
            _ => best = Some(day),
        }
    }
    best
}

/// Left-join day buckets against a date spine; days absent from `days`
/// surface as zero buckets.
pub fn left_join_spine(spine: &[NaiveDate], days: &[DayBucket]) -> Vec<DayBucket> {
    let by_date: BTreeMap<NaiveDate, &DayBucket> = days.iter().map(|d| (d.date, d)).collect();
    spine
        .iter()
        .map(|date| {
            by_date
                .get(date)
                .map(|d| (*d).clone())
                .unwrap_or_else(|| DayBucket::empty(*date))
        })
        .collect()
}
