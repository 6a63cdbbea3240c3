//! Monthly rollup for a calendar year

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::bucket;
use super::guard_div;
use super::types::{MonthValue, MonthlyStats};
use crate::data::types::TimePoint;
use crate::domain::calendar;

/// Month totals for `year`, elapsed months only: for the current year the
/// rollup stops at the month containing today (inclusive), so empty future
/// months do not drag the average down.
pub fn monthly_for_year(points: &[TimePoint], year: i32, now: DateTime<Utc>) -> MonthlyStats {
    let today = calendar::paris_date(now);
    let last_month = if year == today.year() {
        today.month()
    } else if year < today.year() {
        12
    } else {
        0
    };

    let by_month = bucket::bucket_by_month(points);
    let months: Vec<MonthValue> = (1..=last_month)
        .map(|m| {
            // Month 1..=12 of a valid year always exists.
            let first = NaiveDate::from_ymd_opt(year, m, 1).unwrap();
            let total = by_month
                .iter()
                .find(|b| b.date == first)
                .map(|b| b.sum)
                .unwrap_or(0.0);
            MonthValue {
                month: format!("{:04}-{:02}", year, m),
                total,
            }
        })
        .collect();

    let total: f64 = months.iter().map(|m| m.total).sum();
    let best_month = months
        .iter()
        .fold(None::<&MonthValue>, |best, m| match best {
            Some(b) if m.total <= b.total => Some(b),
            _ => Some(m),
        })
        .filter(|m| m.total > 0.0)
        .cloned();

    MonthlyStats {
        year,
        average: guard_div(total, months.len() as f64),
        months,
        total,
        best_month,
    }
}
