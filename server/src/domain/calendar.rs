//! Europe/Paris calendar arithmetic
//!
//! Counter readings are stored as UTC instants but every statistic is bucketed
//! by Paris wall-clock calendar units. This module is the single place where
//! that conversion happens: day/week/month/year boundaries, ISO week
//! numbering, and date spines. All other modules go through these functions,
//! including the store-side grouped queries, so the in-process and SQL paths
//! cannot disagree at DST edges.
//!
//! Local-time resolution policy: an ambiguous local time (fall-back night)
//! resolves to the earlier instant; a nonexistent local time (spring-forward
//! gap) resolves by stepping forward one hour. Neither can occur at local
//! midnight for Europe/Paris (transitions happen at 02:00/03:00), but the
//! policy is applied uniformly rather than assumed away.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Europe::Paris;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no ISO week {week} in year {year}")]
    InvalidWeek { year: i32, week: u32 },

    #[error("invalid calendar date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("local time {0} cannot be resolved in Europe/Paris")]
    Unresolvable(NaiveDateTime),
}

/// UTC range equivalent of a Paris-local calendar unit.
///
/// `start_utc` is local 00:00:00.000 of the unit's first date, `end_utc` is
/// local 23:59:59.999 of its last date. Always recomputed, never cached: the
/// Paris UTC offset changes across DST boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBoundary {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
}

/// UTC offset of Europe/Paris at `t`, in hours (+1 winter, +2 summer).
///
/// Derived from the tz database entry for the instant itself, never from the
/// host timezone or from "now".
pub fn paris_offset_hours(t: DateTime<Utc>) -> f64 {
    let local = t.with_timezone(&Paris);
    f64::from(local.offset().fix().local_minus_utc()) / 3600.0
}

/// Paris wall-clock fields of `t`, for field extraction only.
///
/// The returned value is a naive local datetime; never store it or feed it
/// back as if it were UTC.
pub fn to_paris_local(t: DateTime<Utc>) -> NaiveDateTime {
    t.with_timezone(&Paris).naive_local()
}

/// Paris-local calendar date of `t`.
pub fn paris_date(t: DateTime<Utc>) -> NaiveDate {
    t.with_timezone(&Paris).date_naive()
}

/// Paris-local hour of day (0..=23) of `t`.
pub fn paris_hour(t: DateTime<Utc>) -> u32 {
    use chrono::Timelike;
    t.with_timezone(&Paris).hour()
}

/// Paris-local weekday of `t`.
pub fn paris_weekday(t: DateTime<Utc>) -> Weekday {
    t.with_timezone(&Paris).weekday()
}

/// Resolve a Paris-local naive datetime to the UTC instant it names.
pub fn try_from_paris_local(naive: NaiveDateTime) -> Result<DateTime<Utc>, CalendarError> {
    Paris
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            // Spring-forward gap: the skipped wall-clock hour maps onto the
            // hour that follows it.
            Paris
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(CalendarError::Unresolvable(naive))
}

/// Infallible variant of [`try_from_paris_local`].
///
/// On resolution failure (not reachable for tz-database-backed zones, kept
/// for the documented degradation path) falls back to treating the local
/// time as winter time, UTC+1, and logs a warning.
pub fn from_paris_local(naive: NaiveDateTime) -> DateTime<Utc> {
    try_from_paris_local(naive).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Paris local time resolution failed, assuming UTC+1");
        DateTime::from_naive_utc_and_offset(naive - Duration::hours(1), Utc)
    })
}

// =============================================================================
// Date-level boundaries (Paris-local dates -> UTC instants)
// =============================================================================

/// UTC instant of Paris-local 00:00:00.000 on `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    from_paris_local(date.and_time(NaiveTime::MIN))
}

/// UTC instant of Paris-local 23:59:59.999 on `date`.
pub fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap());
    from_paris_local(end)
}

/// Monday of the ISO week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn month_first(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists.
    date.with_day(1).unwrap()
}

/// Last day of the month containing `date`.
pub fn month_last(date: NaiveDate) -> NaiveDate {
    let first = month_first(date);
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.unwrap() - Duration::days(1)
}

// =============================================================================
// Instant-level boundaries
// =============================================================================

pub fn start_of_day_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(paris_date(t))
}

pub fn end_of_day_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_end(paris_date(t))
}

/// Monday 00:00:00.000 Paris of the week containing `t`, as UTC.
pub fn start_of_week_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(week_monday(paris_date(t)))
}

/// Sunday 23:59:59.999 Paris of the week containing `t`, as UTC.
pub fn end_of_week_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_end(week_monday(paris_date(t)) + Duration::days(6))
}

pub fn start_of_month_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(month_first(paris_date(t)))
}

pub fn end_of_month_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_end(month_last(paris_date(t)))
}

pub fn start_of_year_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    day_start(paris_date(t).with_ordinal(1).unwrap())
}

pub fn end_of_year_paris(t: DateTime<Utc>) -> DateTime<Utc> {
    let year = paris_date(t).year();
    day_end(NaiveDate::from_ymd_opt(year, 12, 31).unwrap())
}

/// UTC range of the Paris-local day containing `date`.
pub fn day_bounds(date: NaiveDate) -> PeriodBoundary {
    PeriodBoundary {
        start_utc: day_start(date),
        end_utc: day_end(date),
    }
}

/// UTC range of the Monday-start week containing `date`.
pub fn week_bounds(date: NaiveDate) -> PeriodBoundary {
    let monday = week_monday(date);
    PeriodBoundary {
        start_utc: day_start(monday),
        end_utc: day_end(monday + Duration::days(6)),
    }
}

/// UTC range of a Paris-local calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<PeriodBoundary, CalendarError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidDate {
        year,
        month,
        day: 1,
    })?;
    Ok(PeriodBoundary {
        start_utc: day_start(first),
        end_utc: day_end(month_last(first)),
    })
}

/// UTC range of a Paris-local calendar year.
pub fn year_bounds(year: i32) -> Result<PeriodBoundary, CalendarError> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(CalendarError::InvalidDate {
        year,
        month: 1,
        day: 1,
    })?;
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
    Ok(PeriodBoundary {
        start_utc: day_start(jan1),
        end_utc: day_end(dec31),
    })
}

// =============================================================================
// ISO week numbering
// =============================================================================

/// ISO-8601 week number of `t`'s Paris-local date (Thursday-anchored rule).
pub fn iso_week_number(t: DateTime<Utc>) -> u32 {
    paris_date(t).iso_week().week()
}

/// ISO-8601 week-based year of `t`'s Paris-local date.
///
/// Differs from the calendar year around New Year: 2024-12-30 belongs to
/// 2025-W01.
pub fn iso_week_year(t: DateTime<Utc>) -> i32 {
    paris_date(t).iso_week().year()
}

/// Monday 00:00 Paris (as UTC) of the given ISO week.
///
/// Inverse of [`iso_week_number`]: for any day `d` of that week,
/// `iso_week_number(d)` round-trips back to `week`.
pub fn week_start_date(year: i32, week: u32) -> Result<DateTime<Utc>, CalendarError> {
    let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or(CalendarError::InvalidWeek { year, week })?;
    Ok(day_start(monday))
}

// =============================================================================
// Spines and year helpers
// =============================================================================

/// Gap-free inclusive sequence of calendar dates, for left-joining against
/// sparse data so missing days surface as zero instead of being absent.
pub fn day_spine(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = from;
    while d <= to {
        dates.push(d);
        d += Duration::days(1);
    }
    dates
}

/// Number of days in a calendar year (365 or 366).
pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_some_and(|d| d.leap_year()) {
        366
    } else {
        365
    }
}

/// The date in `year` matching `reference`'s month and day, clamped to the
/// end of the month when the day does not exist (Feb 29 in a common year).
pub fn same_calendar_day(year: i32, reference: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, reference.month(), reference.day()).unwrap_or_else(|| {
        month_last(NaiveDate::from_ymd_opt(year, reference.month(), 1).unwrap())
    })
}
