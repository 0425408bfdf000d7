//! Decision-free row descriptions.

use std::collections::BTreeMap;

use rowforge_core::{Field, ProfileFields};

use crate::fieldspecs::{FieldSpec, FieldSpecMerger};

/// A fully reduced description of one shape of row: the profile's fields
/// with every constrained field mapped to a single spec and no decisions
/// left. Fields the map does not mention are unrestricted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    fields: ProfileFields,
    specs: BTreeMap<Field, FieldSpec>,
}

impl RowSpec {
    pub fn new(fields: ProfileFields, specs: BTreeMap<Field, FieldSpec>) -> Self {
        Self { fields, specs }
    }

    pub fn unrestricted(fields: ProfileFields) -> Self {
        Self {
            fields,
            specs: BTreeMap::new(),
        }
    }

    pub fn with_spec(mut self, field: Field, spec: FieldSpec) -> Self {
        self.specs.insert(field, spec);
        self
    }

    /// Declared fields in profile order.
    pub fn fields(&self) -> &ProfileFields {
        &self.fields
    }

    pub fn spec_for(&self, field: &Field) -> Option<&FieldSpec> {
        self.specs.get(field)
    }

    /// Spec for a field, with the unrestricted spec standing in for
    /// fields the row does not mention.
    pub fn spec_or_empty(&self, field: &Field) -> FieldSpec {
        self.specs.get(field).cloned().unwrap_or_default()
    }

    pub fn specs(&self) -> impl Iterator<Item = (&Field, &FieldSpec)> + '_ {
        self.specs.iter()
    }
}

/// Field-wise conjunction of two row specs.
#[derive(Debug, Clone, Default)]
pub struct RowSpecMerger {
    field_merger: FieldSpecMerger,
}

impl RowSpecMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` when any shared field merges to a contradiction. The empty
    /// field spec is the merge identity, so fields present on one side
    /// only carry over unchanged.
    pub fn merge(&self, a: &RowSpec, b: &RowSpec) -> Option<RowSpec> {
        let mut specs = a.specs.clone();
        for (field, spec) in &b.specs {
            let merged = match specs.get(field) {
                Some(existing) => self.field_merger.merge(existing, spec)?,
                None => spec.clone(),
            };
            specs.insert(field.clone(), merged);
        }
        Some(RowSpec {
            fields: a.fields.clone(),
            specs,
        })
    }
}
