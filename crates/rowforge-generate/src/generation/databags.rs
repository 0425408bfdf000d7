//! Generated rows and their cells.

use std::collections::BTreeMap;

use rowforge_core::{DataValue, Field};

use crate::fieldspecs::{FieldSpec, FieldSpecSource};

/// One generated cell: the value plus the formatting and provenance of
/// the spec that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBagValue {
    value: DataValue,
    formatting: Option<String>,
    source: FieldSpecSource,
}

impl DataBagValue {
    pub fn new(value: DataValue, formatting: Option<String>, source: FieldSpecSource) -> Self {
        Self {
            value,
            formatting,
            source,
        }
    }

    pub fn from_value(value: DataValue) -> Self {
        Self::new(value, None, FieldSpecSource::empty())
    }

    pub fn value(&self) -> &DataValue {
        &self.value
    }

    pub fn formatting(&self) -> Option<&str> {
        self.formatting.as_deref()
    }

    pub fn source(&self) -> &FieldSpecSource {
        &self.source
    }

    /// Renders the cell, substituting the value into each `{}` of the
    /// formatting template when one is present.
    pub fn formatted(&self) -> String {
        match &self.formatting {
            Some(template) => template.replace("{}", &self.value.to_string()),
            None => self.value.to_string(),
        }
    }

    /// Re-ingests this cell as a fixed spec admitting exactly its value,
    /// keeping formatting and provenance.
    pub fn to_field_spec(&self) -> FieldSpec {
        let spec = FieldSpec::for_value(self.value.clone());
        let spec = match &self.formatting {
            Some(formatting) => spec.with_formatting(formatting.clone()),
            None => spec,
        };
        spec.with_source(self.source.clone())
    }
}

/// One generated row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataBag {
    values: BTreeMap<Field, DataBagValue>,
}

impl DataBag {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: Field, value: DataBagValue) -> Self {
        self.values.insert(field, value);
        self
    }

    /// Union of two bags. Callers must only merge bags over disjoint
    /// field sets; a shared field keeps the right-hand cell.
    pub fn merge(a: &DataBag, b: &DataBag) -> DataBag {
        debug_assert!(
            a.values.keys().all(|field| !b.values.contains_key(field)),
            "merged bags share a field"
        );
        let mut values = a.values.clone();
        values.extend(b.values.iter().map(|(f, v)| (f.clone(), v.clone())));
        DataBag { values }
    }

    pub fn value_of(&self, field: &Field) -> Option<&DataValue> {
        self.values.get(field).map(DataBagValue::value)
    }

    pub fn cell(&self, field: &Field) -> Option<&DataBagValue> {
        self.values.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.values.keys()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&Field, &DataBagValue)> + '_ {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Lazy single-consumer stream of generated rows.
pub type DataBagIterator = Box<dyn Iterator<Item = DataBag>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_substitutes_the_rendered_value() {
        let cell = DataBagValue::new(
            DataValue::from(42),
            Some("id-{}".to_string()),
            FieldSpecSource::empty(),
        );
        assert_eq!(cell.formatted(), "id-42");
        assert_eq!(DataBagValue::from_value(DataValue::from(42)).formatted(), "42");
    }

    #[test]
    fn cell_reingests_as_a_singleton_spec() {
        let cell = DataBagValue::from_value(DataValue::from("fixed"));
        let spec = cell.to_field_spec();
        assert!(!spec.is_nullable());
        assert!(spec.whitelist().unwrap().contains(&DataValue::from("fixed")));

        let null_spec = DataBagValue::from_value(DataValue::Null).to_field_spec();
        assert!(null_spec.is_nullable());
        assert!(null_spec.whitelist().unwrap().is_empty());
    }
}
