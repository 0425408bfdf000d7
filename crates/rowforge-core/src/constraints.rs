use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::fields::Field;
use crate::granularity::DateTimeGranularity;
use crate::values::{DataType, DataValue};

/// The rule a constraint was declared under, kept for cell provenance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleInformation {
    pub description: String,
}

impl RuleInformation {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Financial identifier standards a string field can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardType {
    Ric,
    Isin,
    Sedol,
    Cusip,
}

/// The closed vocabulary of constraint kinds.
///
/// Adding a variant here is a compile error at every consumer that matches
/// on it, so no constraint can fall through to a silent default.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Value must be one of the listed values.
    InSet(Vec<DataValue>),
    IsNull,
    OfType(DataType),
    GreaterThan { limit: Decimal, inclusive: bool },
    LessThan { limit: Decimal, inclusive: bool },
    After { limit: NaiveDateTime, inclusive: bool },
    Before { limit: NaiveDateTime, inclusive: bool },
    /// At most this many decimal places.
    GranularToNumeric(u32),
    GranularToDate(DateTimeGranularity),
    MatchesRegex(String),
    ContainsRegex(String),
    MatchesStandard(StandardType),
    HasFormat(String),
    HasLength(u32),
    ShorterThan(u32),
    LongerThan(u32),
    Not(Box<ConstraintKind>),
    /// Deliberately violated constraint, retained whole for provenance.
    Violated(Box<AtomicConstraint>),
}

/// A single constraint over a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AtomicConstraint {
    pub field: Field,
    pub kind: ConstraintKind,
    /// Rules this constraint was declared under.
    pub rules: BTreeSet<RuleInformation>,
}

impl AtomicConstraint {
    pub fn new(field: Field, kind: ConstraintKind) -> Self {
        Self {
            field,
            kind,
            rules: BTreeSet::new(),
        }
    }

    pub fn from_rule(field: Field, kind: ConstraintKind, rule: RuleInformation) -> Self {
        Self {
            field,
            kind,
            rules: BTreeSet::from([rule]),
        }
    }

    /// Logical negation. `Not(Not(x))` collapses to `x`.
    pub fn negated(self) -> Self {
        let kind = match self.kind {
            ConstraintKind::Not(inner) => *inner,
            other => ConstraintKind::Not(Box::new(other)),
        };
        Self { kind, ..self }
    }

    /// Wraps this constraint as a deliberate violation.
    pub fn violated(self) -> Self {
        let field = self.field.clone();
        let rules = self.rules.clone();
        Self {
            field,
            kind: ConstraintKind::Violated(Box::new(self)),
            rules,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_negation_collapses() {
        let constraint = AtomicConstraint::new(Field::new("price"), ConstraintKind::IsNull);
        let double = constraint.clone().negated().negated();
        assert_eq!(double, constraint);
    }

    #[test]
    fn violation_keeps_field_and_rules() {
        let constraint = AtomicConstraint::from_rule(
            Field::new("price"),
            ConstraintKind::IsNull,
            RuleInformation::new("price rule"),
        );
        let violated = constraint.clone().violated();
        assert_eq!(violated.field, constraint.field);
        assert_eq!(violated.rules, constraint.rules);
        assert_eq!(
            violated.kind,
            ConstraintKind::Violated(Box::new(constraint))
        );
    }
}
