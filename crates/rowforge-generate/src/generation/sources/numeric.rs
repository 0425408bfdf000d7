//! Decimal generation on a granularity grid between bounds.

use std::collections::BTreeSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use rowforge_core::DataValue;

use crate::defaults::{DEFAULT_DECIMAL_PLACES, NUMERIC_MAX, NUMERIC_MIN};
use crate::fieldspecs::FieldSpec;
use crate::generation::sources::{FieldValueSource, ValueIterator};

/// Random draws rejected before the stream concedes the range is all
/// excluded.
const RANDOM_ATTEMPT_LIMIT: u32 = 100;

/// Generates decimals at the spec's scale between its bounds, skipping
/// blacklisted values.
///
/// Bounds are snapped onto the grid at construction: the minimum rounds
/// up, the maximum rounds down, and an exclusive bound already on the
/// grid moves one step inward.
#[derive(Debug, Clone)]
pub struct RealNumberSource {
    min: Decimal,
    max: Decimal,
    step: Decimal,
    scale: u32,
    excluded: BTreeSet<Decimal>,
}

impl RealNumberSource {
    pub fn from_spec(spec: &FieldSpec) -> Self {
        let restrictions = spec.numeric().cloned().unwrap_or_default();
        let scale = restrictions.decimal_places.unwrap_or(DEFAULT_DECIMAL_PLACES);
        let step = Decimal::new(1, scale);
        let min = match restrictions.min {
            Some(limit) => {
                let snapped =
                    limit.value.round_dp_with_strategy(scale, RoundingStrategy::ToPositiveInfinity);
                if !limit.inclusive && snapped == limit.value {
                    snapped + step
                } else {
                    snapped
                }
            }
            None => NUMERIC_MIN,
        };
        let max = match restrictions.max {
            Some(limit) => {
                let snapped =
                    limit.value.round_dp_with_strategy(scale, RoundingStrategy::ToNegativeInfinity);
                if !limit.inclusive && snapped == limit.value {
                    snapped - step
                } else {
                    snapped
                }
            }
            None => NUMERIC_MAX,
        };
        let excluded = spec
            .blacklist()
            .map(|blacklist| {
                blacklist
                    .values
                    .iter()
                    .filter_map(DataValue::as_decimal)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            min,
            max,
            step,
            scale,
            excluded,
        }
    }

    fn is_empty_range(&self) -> bool {
        self.min > self.max
    }

    fn admits(&self, value: Decimal) -> bool {
        !self.excluded.contains(&value)
    }

    fn random_candidate(&self, rng: &mut ChaCha8Rng) -> Decimal {
        let lo = self.min.to_f64().unwrap_or(0.0);
        let hi = self.max.to_f64().unwrap_or(0.0);
        if hi <= lo {
            return self.min;
        }
        let drawn = rng.random_range(lo..=hi);
        Decimal::from_f64_retain(drawn)
            .unwrap_or(self.min)
            .round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero)
            .clamp(self.min, self.max)
    }
}

impl FieldValueSource for RealNumberSource {
    fn all_values(&self) -> ValueIterator {
        Box::new(SteppedDecimals {
            done: self.is_empty_range(),
            next: self.min,
            source: self.clone(),
        })
    }

    fn random_values(&self, rng: ChaCha8Rng) -> ValueIterator {
        Box::new(RandomDecimals {
            exhausted: self.is_empty_range(),
            source: self.clone(),
            rng,
        })
    }
}

struct SteppedDecimals {
    source: RealNumberSource,
    next: Decimal,
    done: bool,
}

impl Iterator for SteppedDecimals {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        loop {
            if self.done {
                return None;
            }
            let current = self.next;
            if current > self.source.max {
                self.done = true;
                return None;
            }
            match current.checked_add(self.source.step) {
                Some(next) => self.next = next,
                None => self.done = true,
            }
            if self.source.admits(current) {
                return Some(DataValue::Numeric(current));
            }
        }
    }
}

struct RandomDecimals {
    source: RealNumberSource,
    rng: ChaCha8Rng,
    exhausted: bool,
}

impl Iterator for RandomDecimals {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        if self.exhausted {
            return None;
        }
        for _ in 0..RANDOM_ATTEMPT_LIMIT {
            let candidate = self.source.random_candidate(&mut self.rng);
            if self.source.admits(candidate) {
                return Some(DataValue::Numeric(candidate));
            }
        }
        self.exhausted = true;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rowforge_core::DataType;

    use crate::restrictions::{BlacklistRestrictions, NumericLimit, NumericRestrictions};

    fn source(restrictions: NumericRestrictions) -> RealNumberSource {
        RealNumberSource::from_spec(&FieldSpec::empty().with_numeric(restrictions))
    }

    #[test]
    fn steps_on_the_scale_grid_between_bounds() {
        let restrictions = NumericRestrictions {
            min: Some(NumericLimit::exclusive(Decimal::ONE)),
            max: Some(NumericLimit::inclusive(Decimal::TWO)),
            decimal_places: Some(1),
        };
        let values: Vec<DataValue> = source(restrictions).all_values().collect();
        let expected: Vec<DataValue> = (11..=20)
            .map(|tenths| DataValue::Numeric(Decimal::new(tenths, 1)))
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn blacklisted_values_are_skipped() {
        let spec = FieldSpec::empty()
            .with_numeric(NumericRestrictions {
                min: Some(NumericLimit::inclusive(Decimal::ZERO)),
                max: Some(NumericLimit::inclusive(Decimal::from(3))),
                decimal_places: Some(0),
            })
            .with_blacklist(BlacklistRestrictions::of([DataValue::from(2)]));
        let values: Vec<DataValue> = RealNumberSource::from_spec(&spec).all_values().collect();
        assert_eq!(
            values,
            vec![DataValue::from(0), DataValue::from(1), DataValue::from(3)]
        );
    }

    #[test]
    fn random_values_stay_in_bounds_and_on_grid() {
        let restrictions = NumericRestrictions {
            min: Some(NumericLimit::inclusive(Decimal::from(-5))),
            max: Some(NumericLimit::inclusive(Decimal::from(5))),
            decimal_places: Some(0),
        };
        let generated = source(restrictions).random_values(ChaCha8Rng::seed_from_u64(9));
        for value in generated.take(40) {
            let number = value.as_decimal().expect("numeric value");
            assert!(number >= Decimal::from(-5) && number <= Decimal::from(5));
            assert_eq!(number.normalize().scale(), 0);
            assert_eq!(value.data_type(), Some(DataType::Numeric));
        }
    }

    #[test]
    fn inverted_bounds_produce_nothing() {
        let restrictions = NumericRestrictions {
            min: Some(NumericLimit::inclusive(Decimal::TEN)),
            max: Some(NumericLimit::inclusive(Decimal::ONE)),
            decimal_places: None,
        };
        assert_eq!(source(restrictions).all_values().count(), 0);
    }
}
