//! Datetime generation by granularity stepping between bounds.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rowforge_core::{DataValue, DateTimeGranularity};

use crate::defaults::{datetime_max, datetime_min};
use crate::fieldspecs::FieldSpec;
use crate::generation::sources::{FieldValueSource, ValueIterator};

const RANDOM_ATTEMPT_LIMIT: u32 = 100;

/// Generates datetimes on the granularity grid between the spec bounds.
#[derive(Debug, Clone)]
pub struct DateTimeSource {
    min: NaiveDateTime,
    max: NaiveDateTime,
    granularity: DateTimeGranularity,
    excluded: BTreeSet<NaiveDateTime>,
}

impl DateTimeSource {
    pub fn from_spec(spec: &FieldSpec) -> Self {
        let restrictions = spec.datetime().cloned().unwrap_or_default();
        let granularity = restrictions.granularity;
        let min = match restrictions.min {
            Some(limit) => {
                let floor = granularity.truncate(limit.value);
                if floor == limit.value && limit.inclusive {
                    floor
                } else {
                    // Off-grid or exclusive: the next grid point.
                    granularity.step(floor).unwrap_or(floor)
                }
            }
            None => granularity.truncate(datetime_min()),
        };
        let max = match restrictions.max {
            Some(limit) => {
                let floor = granularity.truncate(limit.value);
                if floor == limit.value && !limit.inclusive {
                    granularity.step_back(floor).unwrap_or(floor)
                } else {
                    floor
                }
            }
            None => granularity.truncate(datetime_max()),
        };
        let excluded = spec
            .blacklist()
            .map(|blacklist| {
                blacklist
                    .values
                    .iter()
                    .filter_map(DataValue::as_datetime)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            min,
            max,
            granularity,
            excluded,
        }
    }

    fn admits(&self, value: NaiveDateTime) -> bool {
        !self.excluded.contains(&value)
    }

    fn random_candidate(&self, rng: &mut ChaCha8Rng) -> NaiveDateTime {
        let lo = self.min.and_utc().timestamp_millis();
        let hi = self.max.and_utc().timestamp_millis();
        if hi <= lo {
            return self.min;
        }
        let drawn = rng.random_range(lo..=hi);
        let candidate = DateTime::from_timestamp_millis(drawn)
            .map(|dt| dt.naive_utc())
            .unwrap_or(self.min);
        let snapped = self.granularity.truncate(candidate);
        if snapped < self.min { self.min } else { snapped }
    }
}

impl FieldValueSource for DateTimeSource {
    fn all_values(&self) -> ValueIterator {
        let start = (self.min <= self.max).then_some(self.min);
        Box::new(AscendingDateTimes {
            source: self.clone(),
            current: start,
        })
    }

    fn random_values(&self, rng: ChaCha8Rng) -> ValueIterator {
        Box::new(RandomDateTimes {
            exhausted: self.min > self.max,
            source: self.clone(),
            rng,
        })
    }
}

struct AscendingDateTimes {
    source: DateTimeSource,
    current: Option<NaiveDateTime>,
}

impl Iterator for AscendingDateTimes {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        loop {
            let current = self.current?;
            if current > self.source.max {
                self.current = None;
                return None;
            }
            self.current = self.source.granularity.step(current);
            if self.source.admits(current) {
                return Some(DataValue::DateTime(current));
            }
        }
    }
}

struct RandomDateTimes {
    source: DateTimeSource,
    rng: ChaCha8Rng,
    exhausted: bool,
}

impl Iterator for RandomDateTimes {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        if self.exhausted {
            return None;
        }
        for _ in 0..RANDOM_ATTEMPT_LIMIT {
            let candidate = self.source.random_candidate(&mut self.rng);
            if self.source.admits(candidate) {
                return Some(DataValue::DateTime(candidate));
            }
        }
        self.exhausted = true;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    use crate::restrictions::{DateTimeLimit, DateTimeRestrictions};

    fn day(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn steps_whole_days_between_bounds() {
        let restrictions = DateTimeRestrictions {
            min: Some(DateTimeLimit::inclusive(day(2020, 1, 1))),
            max: Some(DateTimeLimit::exclusive(day(2020, 1, 4))),
            granularity: DateTimeGranularity::Days,
        };
        let spec = FieldSpec::empty().with_datetime(restrictions);
        let values: Vec<DataValue> = DateTimeSource::from_spec(&spec).all_values().collect();
        assert_eq!(
            values,
            vec![
                DataValue::DateTime(day(2020, 1, 1)),
                DataValue::DateTime(day(2020, 1, 2)),
                DataValue::DateTime(day(2020, 1, 3)),
            ]
        );
    }

    #[test]
    fn off_grid_minimum_snaps_to_the_next_grid_point() {
        let mid_day = NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(13, 30, 0))
            .expect("valid date");
        let restrictions = DateTimeRestrictions {
            min: Some(DateTimeLimit::inclusive(mid_day)),
            max: Some(DateTimeLimit::inclusive(day(2020, 1, 2))),
            granularity: DateTimeGranularity::Days,
        };
        let spec = FieldSpec::empty().with_datetime(restrictions);
        let values: Vec<DataValue> = DateTimeSource::from_spec(&spec).all_values().collect();
        assert_eq!(values, vec![DataValue::DateTime(day(2020, 1, 2))]);
    }

    #[test]
    fn random_values_land_on_the_grid_inside_bounds() {
        let restrictions = DateTimeRestrictions {
            min: Some(DateTimeLimit::inclusive(day(2020, 1, 1))),
            max: Some(DateTimeLimit::inclusive(day(2020, 12, 31))),
            granularity: DateTimeGranularity::Days,
        };
        let spec = FieldSpec::empty().with_datetime(restrictions);
        let generated =
            DateTimeSource::from_spec(&spec).random_values(ChaCha8Rng::seed_from_u64(17));
        for value in generated.take(40) {
            let datetime = value.as_datetime().expect("datetime value");
            assert!(datetime >= day(2020, 1, 1) && datetime <= day(2020, 12, 31));
            assert_eq!(DateTimeGranularity::Days.truncate(datetime), datetime);
        }
    }
}
