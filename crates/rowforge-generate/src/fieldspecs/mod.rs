//! Field-level value descriptions compiled from atomic constraints.

pub mod factory;
pub mod merger;
pub mod row_spec;
pub mod whitelist;

pub use factory::FieldSpecFactory;
pub use merger::FieldSpecMerger;
pub use row_spec::{RowSpec, RowSpecMerger};
pub use whitelist::{WeightedElement, Whitelist};

use std::collections::BTreeSet;
use std::fmt;

use rowforge_core::{AtomicConstraint, ConstraintKind, DataValue, RuleInformation};

use crate::restrictions::{
    BlacklistRestrictions, DateTimeRestrictions, NumericRestrictions, StringRestrictions,
    TypeRestrictions,
};

/// Provenance of a field spec: the constraints that shaped it and whether
/// any of them is a deliberate violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpecSource {
    constraints: BTreeSet<AtomicConstraint>,
    violated: bool,
}

impl FieldSpecSource {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records a single constraint, unwrapping violation markers.
    pub fn from_constraint(constraint: &AtomicConstraint) -> Self {
        match &constraint.kind {
            ConstraintKind::Violated(inner) => Self {
                constraints: BTreeSet::from([(**inner).clone()]),
                violated: true,
            },
            _ => Self {
                constraints: BTreeSet::from([constraint.clone()]),
                violated: false,
            },
        }
    }

    pub fn combine(&self, other: &Self) -> Self {
        Self {
            constraints: self.constraints.union(&other.constraints).cloned().collect(),
            violated: self.violated || other.violated,
        }
    }

    pub fn constraints(&self) -> impl Iterator<Item = &AtomicConstraint> + '_ {
        self.constraints.iter()
    }

    pub fn is_violated(&self) -> bool {
        self.violated
    }

    /// Every rule mentioned by the contributing constraints.
    pub fn rules(&self) -> BTreeSet<RuleInformation> {
        self.constraints
            .iter()
            .flat_map(|constraint| constraint.rules.iter().cloned())
            .collect()
    }

    pub fn violates_rule(&self, rule: &RuleInformation) -> bool {
        self.violated
            && self
                .constraints
                .iter()
                .any(|constraint| constraint.rules.contains(rule))
    }
}

/// Everything known about the values one field may take.
///
/// A spec is either a whitelist of concrete values or a conjunction of
/// typed restrictions; setting one side clears the other. An empty
/// whitelist means the field can only be null.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    whitelist: Option<Whitelist>,
    types: Option<TypeRestrictions>,
    numeric: Option<NumericRestrictions>,
    datetime: Option<DateTimeRestrictions>,
    string: Option<StringRestrictions>,
    blacklist: Option<BlacklistRestrictions>,
    nullable: bool,
    formatting: Option<String>,
    source: FieldSpecSource,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::empty()
    }
}

// Provenance travels with the spec but never takes part in equality.
impl PartialEq for FieldSpec {
    fn eq(&self, other: &Self) -> bool {
        self.whitelist == other.whitelist
            && self.types == other.types
            && self.numeric == other.numeric
            && self.datetime == other.datetime
            && self.string == other.string
            && self.blacklist == other.blacklist
            && self.nullable == other.nullable
            && self.formatting == other.formatting
    }
}

impl Eq for FieldSpec {}

impl FieldSpec {
    /// Admits any value of any type, including null.
    pub fn empty() -> Self {
        Self {
            whitelist: None,
            types: None,
            numeric: None,
            datetime: None,
            string: None,
            blacklist: None,
            nullable: true,
            formatting: None,
            source: FieldSpecSource::empty(),
        }
    }

    pub fn from_whitelist(whitelist: Whitelist) -> Self {
        Self::empty().with_whitelist(whitelist)
    }

    /// The empty whitelist: no concrete value is admissible.
    pub fn must_be_null() -> Self {
        Self::from_whitelist(Whitelist::uniform([]))
    }

    /// Admits exactly the given value, or only null for a null value.
    pub fn for_value(value: DataValue) -> Self {
        if value.is_null() {
            Self::must_be_null()
        } else {
            Self::from_whitelist(Whitelist::uniform([value])).not_nullable()
        }
    }

    pub fn with_whitelist(mut self, whitelist: Whitelist) -> Self {
        self.whitelist = Some(whitelist);
        self.types = None;
        self.numeric = None;
        self.datetime = None;
        self.string = None;
        self.blacklist = None;
        self
    }

    pub fn with_types(mut self, types: TypeRestrictions) -> Self {
        self.types = Some(types);
        self.whitelist = None;
        self
    }

    pub fn with_numeric(mut self, numeric: NumericRestrictions) -> Self {
        self.numeric = Some(numeric);
        self.whitelist = None;
        self
    }

    pub fn with_datetime(mut self, datetime: DateTimeRestrictions) -> Self {
        self.datetime = Some(datetime);
        self.whitelist = None;
        self
    }

    pub fn with_string(mut self, string: StringRestrictions) -> Self {
        self.string = Some(string);
        self.whitelist = None;
        self
    }

    pub fn with_blacklist(mut self, blacklist: BlacklistRestrictions) -> Self {
        self.blacklist = Some(blacklist);
        self.whitelist = None;
        self
    }

    pub fn not_nullable(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_formatting(mut self, formatting: impl Into<String>) -> Self {
        self.formatting = Some(formatting.into());
        self
    }

    pub fn with_source(mut self, source: FieldSpecSource) -> Self {
        self.source = source;
        self
    }

    pub fn whitelist(&self) -> Option<&Whitelist> {
        self.whitelist.as_ref()
    }

    pub fn types(&self) -> Option<&TypeRestrictions> {
        self.types.as_ref()
    }

    pub fn numeric(&self) -> Option<&NumericRestrictions> {
        self.numeric.as_ref()
    }

    pub fn datetime(&self) -> Option<&DateTimeRestrictions> {
        self.datetime.as_ref()
    }

    pub fn string(&self) -> Option<&StringRestrictions> {
        self.string.as_ref()
    }

    pub fn blacklist(&self) -> Option<&BlacklistRestrictions> {
        self.blacklist.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn formatting(&self) -> Option<&str> {
        self.formatting.as_deref()
    }

    pub fn source(&self) -> &FieldSpecSource {
        &self.source
    }

    /// Whether a concrete value satisfies the typed restrictions.
    ///
    /// Null is governed solely by nullability. Whitelists and blacklists
    /// are membership questions, not restrictions, and are not consulted.
    pub fn permits(&self, value: &DataValue) -> bool {
        if value.is_null() {
            return self.nullable;
        }
        if let (Some(types), Some(data_type)) = (&self.types, value.data_type())
            && !types.is_allowed(data_type)
        {
            return false;
        }
        match value {
            DataValue::Null => true,
            DataValue::Numeric(number) => {
                self.numeric.as_ref().is_none_or(|r| r.contains(*number))
            }
            DataValue::DateTime(datetime) => {
                self.datetime.as_ref().is_none_or(|r| r.contains(*datetime))
            }
            DataValue::String(text) => self.string.as_ref().is_none_or(|r| r.matches(text)),
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(whitelist) = &self.whitelist {
            if whitelist.is_empty() {
                return write!(f, "null only");
            }
            write!(f, "in set of {}", whitelist.len())?;
            if !self.nullable {
                write!(f, ", not null")?;
            }
            return Ok(());
        }
        let mut parts = Vec::new();
        if let Some(types) = &self.types {
            parts.push(types.to_string());
        }
        if let Some(numeric) = &self.numeric {
            parts.push(numeric.to_string());
        }
        if let Some(datetime) = &self.datetime {
            parts.push(datetime.to_string());
        }
        if let Some(string) = &self.string {
            parts.push(string.to_string());
        }
        if let Some(blacklist) = &self.blacklist {
            parts.push(blacklist.to_string());
        }
        if !self.nullable {
            parts.push("not null".to_string());
        }
        if parts.is_empty() {
            write!(f, "<all values>")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowforge_core::{DataType, Field};
    use rust_decimal::Decimal;

    #[test]
    fn whitelist_and_restrictions_are_mutually_exclusive() {
        let spec = FieldSpec::empty()
            .with_types(TypeRestrictions::of(DataType::Numeric))
            .with_whitelist(Whitelist::uniform([DataValue::from(1)]));
        assert!(spec.types().is_none());
        let spec = spec.with_numeric(NumericRestrictions::granular_to(0));
        assert!(spec.whitelist().is_none());
    }

    #[test]
    fn equality_ignores_provenance() {
        let constraint = AtomicConstraint::new(Field::new("price"), ConstraintKind::IsNull);
        let plain = FieldSpec::must_be_null();
        let sourced = FieldSpec::must_be_null()
            .with_source(FieldSpecSource::from_constraint(&constraint));
        assert_eq!(plain, sourced);
    }

    #[test]
    fn permits_checks_type_then_typed_restrictions() {
        let spec = FieldSpec::empty()
            .with_types(TypeRestrictions::of(DataType::Numeric))
            .with_numeric(NumericRestrictions::at_least(
                crate::restrictions::NumericLimit::inclusive(Decimal::TEN),
            ))
            .not_nullable();
        assert!(spec.permits(&DataValue::from(11)));
        assert!(!spec.permits(&DataValue::from(9)));
        assert!(!spec.permits(&DataValue::from("eleven")));
        assert!(!spec.permits(&DataValue::Null));
    }
}
