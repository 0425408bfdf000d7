use chrono::{Datelike, Duration, Months, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a datetime field may be constrained to.
///
/// Ordering runs from finest (`Millis`) to coarsest (`Years`), so the merge
/// of two granularities is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeGranularity {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl DateTimeGranularity {
    /// The coarser of two granularities.
    pub fn coarser(self, other: Self) -> Self {
        self.max(other)
    }

    /// Drops every component finer than this granularity.
    pub fn truncate(self, dt: NaiveDateTime) -> NaiveDateTime {
        let date = dt.date();
        let time = dt.time();
        let truncated = match self {
            DateTimeGranularity::Millis => date.and_hms_milli_opt(
                time.hour(),
                time.minute(),
                time.second(),
                time.nanosecond() / 1_000_000,
            ),
            DateTimeGranularity::Seconds => {
                date.and_hms_opt(time.hour(), time.minute(), time.second())
            }
            DateTimeGranularity::Minutes => date.and_hms_opt(time.hour(), time.minute(), 0),
            DateTimeGranularity::Hours => date.and_hms_opt(time.hour(), 0, 0),
            DateTimeGranularity::Days => date.and_hms_opt(0, 0, 0),
            DateTimeGranularity::Months => date.with_day(1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            DateTimeGranularity::Years => date
                .with_day(1)
                .and_then(|d| d.with_month(1))
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        };
        truncated.unwrap_or(dt)
    }

    /// Advances a datetime by one unit, `None` past the supported range.
    pub fn step(self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            DateTimeGranularity::Millis => dt.checked_add_signed(Duration::milliseconds(1)),
            DateTimeGranularity::Seconds => dt.checked_add_signed(Duration::seconds(1)),
            DateTimeGranularity::Minutes => dt.checked_add_signed(Duration::minutes(1)),
            DateTimeGranularity::Hours => dt.checked_add_signed(Duration::hours(1)),
            DateTimeGranularity::Days => dt.checked_add_signed(Duration::days(1)),
            DateTimeGranularity::Months => dt.checked_add_months(Months::new(1)),
            DateTimeGranularity::Years => dt.checked_add_months(Months::new(12)),
        }
    }

    /// Moves a datetime back by one unit, `None` past the supported range.
    pub fn step_back(self, dt: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            DateTimeGranularity::Millis => dt.checked_sub_signed(Duration::milliseconds(1)),
            DateTimeGranularity::Seconds => dt.checked_sub_signed(Duration::seconds(1)),
            DateTimeGranularity::Minutes => dt.checked_sub_signed(Duration::minutes(1)),
            DateTimeGranularity::Hours => dt.checked_sub_signed(Duration::hours(1)),
            DateTimeGranularity::Days => dt.checked_sub_signed(Duration::days(1)),
            DateTimeGranularity::Months => dt.checked_sub_months(Months::new(1)),
            DateTimeGranularity::Years => dt.checked_sub_months(Months::new(12)),
        }
    }
}

impl fmt::Display for DateTimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DateTimeGranularity::Millis => "millis",
            DateTimeGranularity::Seconds => "seconds",
            DateTimeGranularity::Minutes => "minutes",
            DateTimeGranularity::Hours => "hours",
            DateTimeGranularity::Days => "days",
            DateTimeGranularity::Months => "months",
            DateTimeGranularity::Years => "years",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").expect("valid datetime literal")
    }

    #[test]
    fn truncates_each_granularity() {
        let input = dt("2019-07-23T14:35:27.123456");
        let cases = [
            (DateTimeGranularity::Millis, "2019-07-23T14:35:27.123"),
            (DateTimeGranularity::Seconds, "2019-07-23T14:35:27"),
            (DateTimeGranularity::Minutes, "2019-07-23T14:35:00"),
            (DateTimeGranularity::Hours, "2019-07-23T14:00:00"),
            (DateTimeGranularity::Days, "2019-07-23T00:00:00"),
            (DateTimeGranularity::Months, "2019-07-01T00:00:00"),
            (DateTimeGranularity::Years, "2019-01-01T00:00:00"),
        ];
        for (granularity, expected) in cases {
            assert_eq!(granularity.truncate(input), dt(expected));
        }
    }

    #[test]
    fn coarser_picks_the_larger_unit() {
        assert_eq!(
            DateTimeGranularity::Seconds.coarser(DateTimeGranularity::Days),
            DateTimeGranularity::Days
        );
        assert_eq!(
            DateTimeGranularity::Years.coarser(DateTimeGranularity::Millis),
            DateTimeGranularity::Years
        );
    }

    #[test]
    fn steps_by_one_unit() {
        let start = dt("2019-12-31T23:59:59.999");
        assert_eq!(
            DateTimeGranularity::Millis.step(start),
            Some(dt("2020-01-01T00:00:00.000"))
        );
        let month_start = NaiveDate::from_ymd_opt(2019, 12, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        assert_eq!(
            DateTimeGranularity::Months.step(month_start),
            NaiveDate::from_ymd_opt(2020, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(
            DateTimeGranularity::Years.step(month_start),
            NaiveDate::from_ymd_opt(2020, 12, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn step_back_inverts_step() {
        let start = dt("2020-02-29T00:00:00");
        for granularity in [
            DateTimeGranularity::Millis,
            DateTimeGranularity::Seconds,
            DateTimeGranularity::Minutes,
            DateTimeGranularity::Hours,
            DateTimeGranularity::Days,
        ] {
            let forward = granularity.step(start).expect("within range");
            assert_eq!(granularity.step_back(forward), Some(start));
        }
    }
}
