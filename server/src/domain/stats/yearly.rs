//! Year-to-date progress against full prior years

use chrono::{DateTime, Datelike, Utc};

use super::bucket;
use super::guard_div;
use super::types::{YearProgress, YearlyProgressStats};
use crate::data::types::TimePoint;
use crate::domain::calendar;

/// For each (year, points-of-that-year) pair, the sum up to today's
/// month/day transposed into that year, against the full-year total.
///
/// The dashboard renders "this year is at X% of where a full year would
/// land". `elapsed_share` uses the actual day count of each year, so leap
/// years normalize correctly. Feb 29 cutoffs clamp to Feb 28 in common
/// years.
pub fn yearly_progress(
    years: &[(i32, Vec<TimePoint>)],
    now: DateTime<Utc>,
) -> YearlyProgressStats {
    let today = calendar::paris_date(now);

    let years = years
        .iter()
        .map(|(year, points)| {
            let cutoff = calendar::same_calendar_day(*year, today);
            let days = bucket::bucket_by_day(points);
            let year_to_date: f64 = days
                .iter()
                .filter(|d| d.date <= cutoff)
                .map(|d| d.sum)
                .sum();
            let total: f64 = days.iter().map(|d| d.sum).sum();
            YearProgress {
                year: *year,
                year_to_date,
                total,
                elapsed_share: f64::from(cutoff.ordinal())
                    / f64::from(calendar::days_in_year(*year)),
                progress: guard_div(year_to_date, total),
            }
        })
        .collect();

    YearlyProgressStats { years }
}
