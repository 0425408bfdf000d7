use std::fmt;

use chrono::NaiveDateTime;

use rowforge_core::DateTimeGranularity;

use super::MergeResult;

/// One end of a datetime interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeLimit {
    pub value: NaiveDateTime,
    pub inclusive: bool,
}

impl DateTimeLimit {
    pub fn inclusive(value: NaiveDateTime) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: NaiveDateTime) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// A datetime interval plus the unit values are generated at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeRestrictions {
    pub min: Option<DateTimeLimit>,
    pub max: Option<DateTimeLimit>,
    pub granularity: DateTimeGranularity,
}

impl Default for DateTimeRestrictions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            granularity: DateTimeGranularity::Millis,
        }
    }
}

impl DateTimeRestrictions {
    pub fn after(limit: DateTimeLimit) -> Self {
        Self {
            min: Some(limit),
            ..Self::default()
        }
    }

    pub fn before(limit: DateTimeLimit) -> Self {
        Self {
            max: Some(limit),
            ..Self::default()
        }
    }

    pub fn granular_to(granularity: DateTimeGranularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    /// Takes the tighter bound on each side and the coarser granularity.
    pub fn merge(&self, other: &Self) -> MergeResult<Self> {
        let min = tighter_min(self.min, other.min);
        let max = tighter_max(self.max, other.max);
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo.value > hi.value {
                return MergeResult::Contradiction;
            }
            if lo.value == hi.value && !(lo.inclusive && hi.inclusive) {
                return MergeResult::Contradiction;
            }
        }
        MergeResult::Success(Self {
            min,
            max,
            granularity: self.granularity.coarser(other.granularity),
        })
    }

    /// Whether a value sits inside the interval and on the granularity grid.
    pub fn contains(&self, value: NaiveDateTime) -> bool {
        if let Some(min) = self.min {
            let after = value > min.value || (min.inclusive && value == min.value);
            if !after {
                return false;
            }
        }
        if let Some(max) = self.max {
            let before = value < max.value || (max.inclusive && value == max.value);
            if !before {
                return false;
            }
        }
        self.granularity.truncate(value) == value
    }
}

impl fmt::Display for DateTimeRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(min) = self.min {
            parts.push(format!(
                "{}{}",
                if min.inclusive { ">=" } else { ">" },
                min.value
            ));
        }
        if let Some(max) = self.max {
            parts.push(format!(
                "{}{}",
                if max.inclusive { "<=" } else { "<" },
                max.value
            ));
        }
        parts.push(format!("by {}", self.granularity));
        write!(f, "datetime {}", parts.join(" "))
    }
}

fn tighter_min(a: Option<DateTimeLimit>, b: Option<DateTimeLimit>) -> Option<DateTimeLimit> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if x.value > y.value {
            x
        } else if y.value > x.value {
            y
        } else {
            DateTimeLimit {
                value: x.value,
                inclusive: x.inclusive && y.inclusive,
            }
        }),
        (limit, None) | (None, limit) => limit,
    }
}

fn tighter_max(a: Option<DateTimeLimit>, b: Option<DateTimeLimit>) -> Option<DateTimeLimit> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if x.value < y.value {
            x
        } else if y.value < x.value {
            y
        } else {
            DateTimeLimit {
                value: x.value,
                inclusive: x.inclusive && y.inclusive,
            }
        }),
        (limit, None) | (None, limit) => limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn an_inverted_window_is_a_contradiction() {
        let before = DateTimeRestrictions::before(DateTimeLimit::inclusive(day(2020, 1, 1)));
        let after = DateTimeRestrictions::after(DateTimeLimit::inclusive(day(2021, 1, 1)));
        assert!(before.merge(&after).is_contradiction());
        assert!(after.merge(&before).is_contradiction());
    }

    #[test]
    fn the_coarser_granularity_wins_the_merge() {
        let fine = DateTimeRestrictions::granular_to(DateTimeGranularity::Seconds);
        let coarse = DateTimeRestrictions::granular_to(DateTimeGranularity::Days);
        let merged = fine.merge(&coarse).ok().expect("no bounds to clash");
        assert_eq!(merged.granularity, DateTimeGranularity::Days);
    }

    #[test]
    fn contains_requires_grid_alignment() {
        let restrictions = DateTimeRestrictions {
            min: Some(DateTimeLimit::inclusive(day(2020, 1, 1))),
            max: Some(DateTimeLimit::exclusive(day(2020, 2, 1))),
            granularity: DateTimeGranularity::Days,
        };
        assert!(restrictions.contains(day(2020, 1, 15)));
        assert!(!restrictions.contains(day(2020, 2, 1)));
        let mid_day = NaiveDate::from_ymd_opt(2020, 1, 15)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date");
        assert!(!restrictions.contains(mid_day));
    }
}
