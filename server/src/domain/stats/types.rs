//! Result records for the comparative statistics views
//!
//! These are the exact shapes the dashboard charts index into; field names
//! (`day`, `value`, `hour`, `total`, `average`, `count`, lowercase weekday
//! names in Monday-first order) are part of the contract and must not drift.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// One calendar day and its summed value.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayValue {
    pub day: NaiveDate,
    pub value: f64,
}

/// Daily totals for a calendar year, fully-elapsed days only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyYearStats {
    pub year: i32,
    /// One entry per elapsed spine day, zero-filled.
    pub days: Vec<DayValue>,
    pub total: f64,
    /// total / number of elapsed spine days (fractional, caller rounds).
    pub global_average: f64,
    /// total / number of days with value > 0; 0 when no active days.
    pub active_days_average: f64,
    pub max_day: Option<DayValue>,
}

/// Per-weekday totals over a year, after zero-run noise filtering.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekdayTotal {
    pub weekday: &'static str,
    pub total: f64,
    /// Number of contributing days with value > 0.
    pub count: u32,
    /// total / count, 0 when no active days.
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekdayTotals {
    /// Fixed Monday -> Sunday order.
    pub weekdays: Vec<WeekdayTotal>,
    /// Spine days before zero-run filtering, for transparency.
    pub original_days: usize,
    /// Spine days that survived the filter.
    pub filtered_days: usize,
}

/// One day of the in-progress week; `value` is `null` for days after today
/// so charts can distinguish "no data yet" from "zero passages".
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PendingDayValue {
    pub day: NaiveDate,
    pub value: Option<f64>,
}

/// This week vs the immediately preceding week.
///
/// Zero-is-missing view: both averages exclude null and literal-zero days
/// from the denominator. This deliberately differs from the other views and
/// is a documented per-view policy, not a bug.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekComparison {
    /// Always 7 entries, Monday first.
    pub current: Vec<PendingDayValue>,
    /// Always 7 entries, no truncation.
    pub previous: Vec<DayValue>,
    /// ISO week label, e.g. "2024-W24".
    pub current_label: String,
    pub previous_label: String,
    pub current_average: f64,
    pub previous_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthValue {
    /// "YYYY-MM"
    pub month: String,
    pub total: f64,
}

/// Monthly rollup for a calendar year, elapsed months only.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyStats {
    pub year: i32,
    pub months: Vec<MonthValue>,
    pub total: f64,
    /// total / number of elapsed months, 0 when none.
    pub average: f64,
    pub best_month: Option<MonthValue>,
}

/// Year-to-date position of one year against its full total.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct YearProgress {
    pub year: i32,
    /// Sum Jan 1 .. today's month/day transposed into this year.
    pub year_to_date: f64,
    /// Full-year sum.
    pub total: f64,
    /// Fraction of the calendar elapsed at the cutoff (leap-aware), 0..=1.
    pub elapsed_share: f64,
    /// year_to_date / total, 0 when the year has no data.
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct YearlyProgressStats {
    pub years: Vec<YearProgress>,
}

/// Current period vs the same period one calendar year earlier.
///
/// Series are aligned by index, not by date (the naive one-year shift does
/// not preserve day counts across Feb 29).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EvolutionStats {
    pub current: Vec<DayValue>,
    pub reference: Vec<DayValue>,
    pub current_total: f64,
    pub reference_total: f64,
    /// Percent change of current over reference, 0 when reference is 0.
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GroupStat {
    pub total: f64,
    /// Calendar days in the group within the range, with or without data.
    pub count: u32,
    /// round(total / count), 0 when the group has no days.
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekdayWeekendSplit {
    pub weekday: GroupStat,
    pub weekend: GroupStat,
}

/// One hour of the distribution; zero-total hours are dropped upstream.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct HourShare {
    pub hour: u32,
    pub total: f64,
    /// Percentage of the range total, 0..=100.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HourlyDistribution {
    pub hours: Vec<HourShare>,
}

/// Hour sums per weekday; field order is the iteration order the dashboard
/// relies on.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekdayHours {
    pub monday: Vec<f64>,
    pub tuesday: Vec<f64>,
    pub wednesday: Vec<f64>,
    pub thursday: Vec<f64>,
    pub friday: Vec<f64>,
    pub saturday: Vec<f64>,
    pub sunday: Vec<f64>,
}

/// Hourly-by-weekday detail for one ISO week, with the available year range
/// for the navigation controls.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekProfile {
    pub year: i32,
    pub week: u32,
    pub days: WeekdayHours,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

/// Lowercase English weekday name, for the iteration-ordered views.
pub fn weekday_name(weekday: chrono::Weekday) -> &'static str {
    match weekday {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    }
}
