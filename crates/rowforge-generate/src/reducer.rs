//! Reduces a flat constraint set to a row spec.

use std::collections::BTreeMap;

use rowforge_core::{AtomicConstraint, Field, ProfileFields};

use crate::errors::GenerationError;
use crate::fieldspecs::{FieldSpec, FieldSpecFactory, FieldSpecMerger, RowSpec};

/// Compiles and folds the constraints of a decision-free node into one
/// spec per field.
///
/// `Ok(None)` reports a contradiction. Errors are reserved for profile
/// faults surfaced while compiling individual constraints, such as an
/// invalid regex.
#[derive(Debug, Clone, Default)]
pub struct ConstraintReducer {
    factory: FieldSpecFactory,
    merger: FieldSpecMerger,
}

impl ConstraintReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(
        &self,
        fields: &ProfileFields,
        constraints: &[AtomicConstraint],
    ) -> Result<Option<RowSpec>, GenerationError> {
        let mut grouped: BTreeMap<&Field, Vec<&AtomicConstraint>> = BTreeMap::new();
        for constraint in constraints {
            grouped
                .entry(&constraint.field)
                .or_default()
                .push(constraint);
        }
        let mut specs = BTreeMap::new();
        for (field, field_constraints) in grouped {
            let Some(spec) = self.reduce_field(&field_constraints)? else {
                return Ok(None);
            };
            specs.insert(field.clone(), spec);
        }
        Ok(Some(RowSpec::new(fields.clone(), specs)))
    }

    /// Merged spec for one field's constraints, `None` on contradiction.
    pub fn reduce_field(
        &self,
        constraints: &[&AtomicConstraint],
    ) -> Result<Option<FieldSpec>, GenerationError> {
        let mut merged = FieldSpec::empty();
        for constraint in constraints {
            let compiled = self.factory.construct(constraint)?;
            match self.merger.merge(&merged, &compiled) {
                Some(next) => merged = next,
                None => return Ok(None),
            }
        }
        Ok(Some(merged))
    }
}
