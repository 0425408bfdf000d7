use std::fmt;

use rust_decimal::Decimal;

use super::MergeResult;

/// One end of a numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericLimit {
    pub value: Decimal,
    pub inclusive: bool,
}

impl NumericLimit {
    pub fn inclusive(value: Decimal) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: Decimal) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// A numeric interval plus an optional decimal-place cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericRestrictions {
    pub min: Option<NumericLimit>,
    pub max: Option<NumericLimit>,
    /// Greatest number of decimal places a value may carry.
    pub decimal_places: Option<u32>,
}

impl NumericRestrictions {
    pub fn at_least(limit: NumericLimit) -> Self {
        Self {
            min: Some(limit),
            ..Self::default()
        }
    }

    pub fn at_most(limit: NumericLimit) -> Self {
        Self {
            max: Some(limit),
            ..Self::default()
        }
    }

    pub fn granular_to(decimal_places: u32) -> Self {
        Self {
            decimal_places: Some(decimal_places),
            ..Self::default()
        }
    }

    /// Takes the tighter bound on each side and the smaller decimal-place
    /// cap. Contradiction when the interval is empty.
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
        let decimal_places = match (self.decimal_places, other.decimal_places) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        MergeResult::Success(Self {
            min,
            max,
            decimal_places,
        })
    }

    /// Whether a value sits inside the interval and on the decimal grid.
    pub fn contains(&self, value: Decimal) -> bool {
        if let Some(min) = self.min {
            let above = value > min.value || (min.inclusive && value == min.value);
            if !above {
                return false;
            }
        }
        if let Some(max) = self.max {
            let below = value < max.value || (max.inclusive && value == max.value);
            if !below {
                return false;
            }
        }
        if let Some(places) = self.decimal_places
            && value.normalize().scale() > places
        {
            return false;
        }
        true
    }
}

impl fmt::Display for NumericRestrictions {
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
        if let Some(places) = self.decimal_places {
            parts.push(format!("dp<={places}"));
        }
        write!(f, "numeric {}", parts.join(" "))
    }
}

fn tighter_min(a: Option<NumericLimit>, b: Option<NumericLimit>) -> Option<NumericLimit> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if x.value > y.value {
            x
        } else if y.value > x.value {
            y
        } else {
            // same value, exclusive wins
            NumericLimit {
                value: x.value,
                inclusive: x.inclusive && y.inclusive,
            }
        }),
        (limit, None) | (None, limit) => limit,
    }
}

fn tighter_max(a: Option<NumericLimit>, b: Option<NumericLimit>) -> Option<NumericLimit> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if x.value < y.value {
            x
        } else if y.value < x.value {
            y
        } else {
            NumericLimit {
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

    #[test]
    fn tighter_bounds_win_the_merge() {
        let a = NumericRestrictions {
            min: Some(NumericLimit::inclusive(Decimal::ONE)),
            max: Some(NumericLimit::inclusive(Decimal::from(100))),
            decimal_places: Some(4),
        };
        let b = NumericRestrictions {
            min: Some(NumericLimit::exclusive(Decimal::TEN)),
            max: None,
            decimal_places: Some(2),
        };
        let merged = a.merge(&b).ok().expect("overlapping intervals");
        assert_eq!(merged.min, Some(NumericLimit::exclusive(Decimal::TEN)));
        assert_eq!(merged.max, Some(NumericLimit::inclusive(Decimal::from(100))));
        assert_eq!(merged.decimal_places, Some(2));
    }

    #[test]
    fn an_inverted_interval_is_a_contradiction() {
        let low = NumericRestrictions::at_most(NumericLimit::inclusive(Decimal::ONE));
        let high = NumericRestrictions::at_least(NumericLimit::inclusive(Decimal::TEN));
        assert!(low.merge(&high).is_contradiction());
    }

    #[test]
    fn equal_bounds_with_an_exclusive_side_contradict() {
        let open = NumericRestrictions::at_least(NumericLimit::exclusive(Decimal::TEN));
        let closed = NumericRestrictions::at_most(NumericLimit::inclusive(Decimal::TEN));
        assert!(open.merge(&closed).is_contradiction());

        let closed_both = NumericRestrictions::at_least(NumericLimit::inclusive(Decimal::TEN))
            .merge(&NumericRestrictions::at_most(NumericLimit::inclusive(Decimal::TEN)));
        assert!(!closed_both.is_contradiction());
    }

    #[test]
    fn contains_checks_bounds_and_the_decimal_grid() {
        let restrictions = NumericRestrictions {
            min: Some(NumericLimit::exclusive(Decimal::ZERO)),
            max: Some(NumericLimit::inclusive(Decimal::TEN)),
            decimal_places: Some(1),
        };
        assert!(restrictions.contains(Decimal::new(95, 1)));
        assert!(restrictions.contains(Decimal::TEN));
        assert!(!restrictions.contains(Decimal::ZERO));
        assert!(!restrictions.contains(Decimal::new(955, 2)));
    }
}
