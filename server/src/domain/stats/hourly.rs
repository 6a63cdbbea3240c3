//! Hourly distributions and the per-ISO-week hourly profile

use std::str::FromStr;

use chrono::Weekday;

use super::bucket;
use super::guard_div;
use super::types::{HourShare, HourlyDistribution, WeekProfile, WeekdayHours};
use crate::data::types::TimePoint;
use crate::domain::calendar;

/// Restriction applied before hourly bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClass {
    Weekday,
    Weekend,
}

impl DayClass {
    fn matches(self, weekday: Weekday) -> bool {
        let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
        match self {
            DayClass::Weekday => !weekend,
            DayClass::Weekend => weekend,
        }
    }
}

impl FromStr for DayClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekday" => Ok(DayClass::Weekday),
            "weekend" => Ok(DayClass::Weekend),
            other => Err(format!(
                "invalid day class '{}', expected weekday or weekend",
                other
            )),
        }
    }
}

/// Hour-of-day distribution over a range, optionally restricted to weekday
/// or weekend instants before bucketing.
///
/// Unlike [`bucket::bucket_by_hour_of_day`], hours with a zero total are
/// dropped, and each remaining hour carries its percentage share of the
/// range total.
pub fn hourly_distribution(
    points: &[TimePoint],
    day_class: Option<DayClass>,
) -> HourlyDistribution {
    let filtered: Vec<TimePoint> = match day_class {
        Some(class) => points
            .iter()
            .filter(|p| class.matches(calendar::paris_weekday(p.timestamp)))
            .cloned()
            .collect(),
        None => points.to_vec(),
    };

    let hours = bucket::bucket_by_hour_of_day(&filtered);
    let grand_total: f64 = hours.iter().map(|h| h.sum).sum();

    HourlyDistribution {
        hours: hours
            .into_iter()
            .filter(|h| h.sum != 0.0)
            .map(|h| HourShare {
                hour: h.hour,
                total: h.sum,
                share: guard_div(h.sum * 100.0, grand_total),
            })
            .collect(),
    }
}

/// Weekday x hour profile for one ISO week, packaged with the available
/// year range for the navigation controls.
///
/// `points` must already be fetched for the week's UTC bounds
/// ([`calendar::week_start_date`] .. [`calendar::end_of_week_paris`]).
pub fn week_profile(
    points: &[TimePoint],
    year: i32,
    week: u32,
    year_range: Option<(i32, i32)>,
) -> WeekProfile {
    let grid = bucket::bucket_by_day_of_week(points);
    let row = |wd: Weekday| grid.row(wd).to_vec();

    WeekProfile {
        year,
        week,
        days: WeekdayHours {
            monday: row(Weekday::Mon),
            tuesday: row(Weekday::Tue),
            wednesday: row(Weekday::Wed),
            thursday: row(Weekday::Thu),
            friday: row(Weekday::Fri),
            saturday: row(Weekday::Sat),
            sunday: row(Weekday::Sun),
        },
        first_year: year_range.map(|(first, _)| first),
        last_year: year_range.map(|(_, last)| last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

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
    fn test_distribution_drops_zero_hours() {
        // 08:xx and 18:xx Paris in summer = 06:xx / 16:xx UTC
        let points = vec![
            point("2024-06-10T06:15:00Z", 10.0),
            point("2024-06-10T16:30:00Z", 10.0),
        ];
        let dist = hourly_distribution(&points, None);
        assert_eq!(dist.hours.len(), 2);
        assert_eq!(
            dist.hours[0],
            HourShare { hour: 8, total: 10.0, share: 50.0 }
        );
        assert_eq!(dist.hours[1].hour, 18);
        // The raw bucketer keeps all 24 for the same input
        assert_eq!(bucket::bucket_by_hour_of_day(&points).len(), 24);
    }

    #[test]
    fn test_distribution_empty_input() {
        let dist = hourly_distribution(&[], None);
        assert!(dist.hours.is_empty());
    }

    #[test]
    fn test_distribution_day_class_filter() {
        let points = vec![
            point("2024-06-10T06:15:00Z", 10.0), // Monday
            point("2024-06-15T06:15:00Z", 4.0),  // Saturday
        ];
        let weekend = hourly_distribution(&points, Some(DayClass::Weekend));
        assert_eq!(weekend.hours.len(), 1);
        assert_eq!(weekend.hours[0].total, 4.0);
        assert_eq!(weekend.hours[0].share, 100.0);

        let weekdays = hourly_distribution(&points, Some(DayClass::Weekday));
        assert_eq!(weekdays.hours[0].total, 10.0);
    }

    #[test]
    fn test_day_class_from_str() {
        assert_eq!("weekday".parse::<DayClass>(), Ok(DayClass::Weekday));
        assert_eq!("weekend".parse::<DayClass>(), Ok(DayClass::Weekend));
        assert!("sunday".parse::<DayClass>().is_err());
    }

    #[test]
    fn test_week_profile_grid_and_years() {
        let points = vec![point("2024-06-10T06:15:00Z", 10.0)]; // Monday 08:15 Paris
        let profile = week_profile(&points, 2024, 24, Some((2021, 2024)));
        assert_eq!(profile.days.monday.len(), 24);
        assert_eq!(profile.days.monday[8], 10.0);
        assert_eq!(profile.days.sunday.iter().sum::<f64>(), 0.0);
        assert_eq!(profile.first_year, Some(2021));
        assert_eq!(profile.last_year, Some(2024));
    }

    #[test]
    fn test_week_profile_no_data_years() {
        let profile = week_profile(&[], 2024, 1, None);
        assert_eq!(profile.first_year, None);
        assert_eq!(profile.days.friday.len(), 24);
    }
}
