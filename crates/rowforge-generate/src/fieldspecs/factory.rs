//! Compiles atomic constraints into field specs.

use std::collections::BTreeSet;

use rowforge_core::{AtomicConstraint, ConstraintKind, StandardType};

use crate::errors::GenerationError;
use crate::fieldspecs::{FieldSpec, FieldSpecSource, Whitelist};
use crate::restrictions::{
    BlacklistRestrictions, DateTimeLimit, DateTimeRestrictions, NumericLimit, NumericRestrictions,
    StringRestrictions, TextualRestrictions, TypeRestrictions,
};
use crate::strings::standards::RIC_PATTERN;
use crate::strings::validate_pattern;

/// Translates one atomic constraint into the field spec it implies.
///
/// Construction is fallible only for configuration faults such as an
/// invalid regex. A constraint that merely admits no values still builds,
/// and is discovered later as a merge contradiction.
#[derive(Debug, Clone, Default)]
pub struct FieldSpecFactory;

impl FieldSpecFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn construct(&self, constraint: &AtomicConstraint) -> Result<FieldSpec, GenerationError> {
        let spec = self.build(&constraint.kind)?;
        Ok(spec.with_source(FieldSpecSource::from_constraint(constraint)))
    }

    fn build(&self, kind: &ConstraintKind) -> Result<FieldSpec, GenerationError> {
        let spec = match kind {
            ConstraintKind::InSet(values) => {
                FieldSpec::from_whitelist(Whitelist::uniform(values.iter().cloned()))
            }
            ConstraintKind::IsNull => FieldSpec::must_be_null(),
            ConstraintKind::OfType(data_type) => {
                FieldSpec::empty().with_types(TypeRestrictions::of(*data_type))
            }
            ConstraintKind::GreaterThan { limit, inclusive } => FieldSpec::empty().with_numeric(
                NumericRestrictions::at_least(NumericLimit {
                    value: *limit,
                    inclusive: *inclusive,
                }),
            ),
            ConstraintKind::LessThan { limit, inclusive } => FieldSpec::empty().with_numeric(
                NumericRestrictions::at_most(NumericLimit {
                    value: *limit,
                    inclusive: *inclusive,
                }),
            ),
            ConstraintKind::After { limit, inclusive } => FieldSpec::empty().with_datetime(
                DateTimeRestrictions::after(DateTimeLimit {
                    value: *limit,
                    inclusive: *inclusive,
                }),
            ),
            ConstraintKind::Before { limit, inclusive } => FieldSpec::empty().with_datetime(
                DateTimeRestrictions::before(DateTimeLimit {
                    value: *limit,
                    inclusive: *inclusive,
                }),
            ),
            ConstraintKind::GranularToNumeric(places) => {
                FieldSpec::empty().with_numeric(NumericRestrictions::granular_to(*places))
            }
            ConstraintKind::GranularToDate(granularity) => {
                FieldSpec::empty().with_datetime(DateTimeRestrictions::granular_to(*granularity))
            }
            ConstraintKind::MatchesRegex(pattern) => {
                validate_pattern(pattern, true)?;
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    matching_patterns: BTreeSet::from([pattern.clone()]),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::ContainsRegex(pattern) => {
                validate_pattern(pattern, true)?;
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    containing_patterns: BTreeSet::from([pattern.clone()]),
                    ..TextualRestrictions::default()
                }))
            }
            // RIC has no check digit, so it compiles to its pattern.
            ConstraintKind::MatchesStandard(StandardType::Ric) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    matching_patterns: BTreeSet::from([RIC_PATTERN.to_string()]),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::MatchesStandard(standard) => {
                FieldSpec::empty().with_string(StringRestrictions::Standard(*standard))
            }
            ConstraintKind::HasFormat(format) => FieldSpec::empty().with_formatting(format),
            ConstraintKind::HasLength(length) => FieldSpec::empty()
                .with_string(StringRestrictions::Textual(TextualRestrictions::with_length(
                    *length,
                ))),
            ConstraintKind::ShorterThan(length) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    max_length: Some(length.saturating_sub(1)),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::LongerThan(length) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    min_length: Some(length.saturating_add(1)),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::Not(inner) => self.build_negated(inner)?,
            ConstraintKind::Violated(inner) => self.build(&inner.kind)?,
        };
        Ok(spec)
    }

    fn build_negated(&self, kind: &ConstraintKind) -> Result<FieldSpec, GenerationError> {
        let spec = match kind {
            ConstraintKind::InSet(values) => {
                FieldSpec::empty().with_blacklist(BlacklistRestrictions::of(values.iter().cloned()))
            }
            ConstraintKind::IsNull => FieldSpec::empty().not_nullable(),
            ConstraintKind::OfType(data_type) => {
                FieldSpec::empty().with_types(TypeRestrictions::excluding(*data_type))
            }
            // Negating a bound flips its direction and its inclusivity.
            ConstraintKind::GreaterThan { limit, inclusive } => FieldSpec::empty().with_numeric(
                NumericRestrictions::at_most(NumericLimit {
                    value: *limit,
                    inclusive: !*inclusive,
                }),
            ),
            ConstraintKind::LessThan { limit, inclusive } => FieldSpec::empty().with_numeric(
                NumericRestrictions::at_least(NumericLimit {
                    value: *limit,
                    inclusive: !*inclusive,
                }),
            ),
            ConstraintKind::After { limit, inclusive } => FieldSpec::empty().with_datetime(
                DateTimeRestrictions::before(DateTimeLimit {
                    value: *limit,
                    inclusive: !*inclusive,
                }),
            ),
            ConstraintKind::Before { limit, inclusive } => FieldSpec::empty().with_datetime(
                DateTimeRestrictions::after(DateTimeLimit {
                    value: *limit,
                    inclusive: !*inclusive,
                }),
            ),
            // Granularity and formatting negations carry no information.
            ConstraintKind::GranularToNumeric(_)
            | ConstraintKind::GranularToDate(_)
            | ConstraintKind::HasFormat(_) => FieldSpec::empty(),
            ConstraintKind::MatchesRegex(pattern) => {
                validate_pattern(pattern, false)?;
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    not_matching_patterns: BTreeSet::from([pattern.clone()]),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::ContainsRegex(pattern) => {
                validate_pattern(pattern, false)?;
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    not_containing_patterns: BTreeSet::from([pattern.clone()]),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::MatchesStandard(standard) => {
                FieldSpec::empty().with_string(StringRestrictions::excluding_standard(*standard))
            }
            ConstraintKind::HasLength(length) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    excluded_lengths: BTreeSet::from([*length]),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::ShorterThan(length) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    min_length: Some(*length),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::LongerThan(length) => {
                FieldSpec::empty().with_string(StringRestrictions::Textual(TextualRestrictions {
                    max_length: Some(*length),
                    ..TextualRestrictions::default()
                }))
            }
            ConstraintKind::Not(inner) => self.build(inner)?,
            ConstraintKind::Violated(inner) => self.build_negated(&inner.kind)?,
        };
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rowforge_core::{DataType, DataValue, Field};
    use rust_decimal::Decimal;

    fn constraint(kind: ConstraintKind) -> AtomicConstraint {
        AtomicConstraint::new(Field::new("f"), kind)
    }

    #[test]
    fn negated_bounds_flip_direction_and_inclusivity() {
        let factory = FieldSpecFactory::new();
        let spec = factory
            .construct(&constraint(ConstraintKind::GreaterThan {
                limit: Decimal::TEN,
                inclusive: true,
            })
            .negated())
            .unwrap();
        let numeric = spec.numeric().unwrap();
        assert_eq!(numeric.min, None);
        assert_eq!(
            numeric.max,
            Some(NumericLimit {
                value: Decimal::TEN,
                inclusive: false
            })
        );
    }

    #[test]
    fn ric_standard_expands_to_its_pattern() {
        let factory = FieldSpecFactory::new();
        let spec = factory
            .construct(&constraint(ConstraintKind::MatchesStandard(
                StandardType::Ric,
            )))
            .unwrap();
        match spec.string().unwrap() {
            StringRestrictions::Textual(textual) => {
                assert!(textual.matching_patterns.contains(RIC_PATTERN));
            }
            StringRestrictions::Standard(_) => panic!("RIC should compile to a pattern"),
        }
    }

    #[test]
    fn invalid_regex_is_a_profile_error() {
        let factory = FieldSpecFactory::new();
        let result = factory.construct(&constraint(ConstraintKind::MatchesRegex(
            "[unclosed".to_string(),
        )));
        assert!(matches!(result, Err(GenerationError::InvalidProfile(_))));
    }

    #[test]
    fn violation_marks_provenance_but_builds_the_inner_spec() {
        let factory = FieldSpecFactory::new();
        let violated = constraint(ConstraintKind::OfType(DataType::Numeric)).violated();
        let spec = factory.construct(&violated).unwrap();
        assert!(spec.source().is_violated());
        assert!(spec.types().is_some());
    }

    #[test]
    fn datetime_bounds_compile_to_datetime_restrictions() {
        let factory = FieldSpecFactory::new();
        let limit = NaiveDate::from_ymd_opt(2020, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap();
        let spec = factory
            .construct(&constraint(ConstraintKind::After {
                limit,
                inclusive: false,
            }))
            .unwrap();
        let datetime = spec.datetime().unwrap();
        assert_eq!(
            datetime.min,
            Some(DateTimeLimit {
                value: limit,
                inclusive: false
            })
        );
        assert!(spec.permits(&DataValue::from(
            NaiveDate::from_ymd_opt(2021, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap()
        )));
    }
}
