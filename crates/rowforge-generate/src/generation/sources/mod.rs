//! Per-field value sources derived from merged field specs.

pub mod canned;
pub mod datetime;
pub mod numeric;
pub mod strings;

pub use canned::CannedValuesSource;
pub use datetime::DateTimeSource;
pub use numeric::RealNumberSource;
pub use strings::StringValueSource;

use std::collections::HashMap;

use rand_chacha::ChaCha8Rng;

use rowforge_core::{DataType, DataValue};

use crate::errors::GenerationError;
use crate::fieldspecs::FieldSpec;

/// Lazy stream of candidate values for one field.
pub type ValueIterator = Box<dyn Iterator<Item = DataValue>>;

/// One generator of values satisfying a field spec.
pub trait FieldValueSource {
    /// Exhaustive values in a deterministic order; finite wherever the
    /// spec is bounded.
    fn all_values(&self) -> ValueIterator;

    /// Endless random values drawn from the given stream.
    fn random_values(&self, rng: ChaCha8Rng) -> ValueIterator;
}

/// Emits only the null value.
///
/// The exhaustive stream yields null once; the random stream repeats it,
/// so null stays reachable however often the stream is polled.
#[derive(Debug, Default)]
pub struct NullSource;

impl FieldValueSource for NullSource {
    fn all_values(&self) -> ValueIterator {
        Box::new(std::iter::once(DataValue::Null))
    }

    fn random_values(&self, _rng: ChaCha8Rng) -> ValueIterator {
        Box::new(std::iter::repeat(DataValue::Null))
    }
}

type CreateSource = fn(&FieldSpec) -> Result<Box<dyn FieldValueSource>, GenerationError>;

/// Builds the value source for one generatable type.
pub struct FieldValueSourceFactory {
    type_name: &'static str,
    data_type: DataType,
    create: CreateSource,
}

impl FieldValueSourceFactory {
    pub fn new(type_name: &'static str, data_type: DataType, create: CreateSource) -> Self {
        Self {
            type_name,
            data_type,
            create,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn create_source(
        &self,
        spec: &FieldSpec,
    ) -> Result<Box<dyn FieldValueSource>, GenerationError> {
        (self.create)(spec)
    }
}

/// Source factories keyed by type name.
#[derive(Default)]
pub struct SourceFactoryRegistry {
    factories: HashMap<&'static str, FieldValueSourceFactory>,
}

impl SourceFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in numeric, string and datetime sources.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(FieldValueSourceFactory::new(
            DataType::Numeric.name(),
            DataType::Numeric,
            |spec| Ok(Box::new(RealNumberSource::from_spec(spec))),
        ));
        registry.register(FieldValueSourceFactory::new(
            DataType::String.name(),
            DataType::String,
            |spec| Ok(Box::new(StringValueSource::from_spec(spec)?)),
        ));
        registry.register(FieldValueSourceFactory::new(
            DataType::DateTime.name(),
            DataType::DateTime,
            |spec| Ok(Box::new(DateTimeSource::from_spec(spec))),
        ));
        registry
    }

    pub fn register(&mut self, factory: FieldValueSourceFactory) {
        self.factories.insert(factory.type_name(), factory);
    }

    /// Unknown names are configuration faults, not contradictions.
    pub fn resolve(&self, type_name: &str) -> Result<&FieldValueSourceFactory, GenerationError> {
        self.factories.get(type_name).ok_or_else(|| {
            GenerationError::InvalidConfig(format!(
                "no value source registered for type '{type_name}'"
            ))
        })
    }
}

/// Derives the ordered source list a merged spec calls for.
pub struct FieldSpecSourceEvaluator {
    registry: SourceFactoryRegistry,
}

impl FieldSpecSourceEvaluator {
    pub fn new(registry: SourceFactoryRegistry) -> Self {
        Self { registry }
    }

    pub fn standard() -> Self {
        Self::new(SourceFactoryRegistry::standard())
    }

    /// Typed sources for the spec, with the null source appended last
    /// when the spec is nullable.
    pub fn sources_for(
        &self,
        spec: &FieldSpec,
    ) -> Result<Vec<Box<dyn FieldValueSource>>, GenerationError> {
        let mut sources: Vec<Box<dyn FieldValueSource>> = Vec::new();
        if let Some(whitelist) = spec.whitelist() {
            if !whitelist.is_empty() {
                sources.push(Box::new(CannedValuesSource::new(whitelist.clone())));
            }
        } else {
            for data_type in allowed_types(spec) {
                let factory = self.registry.resolve(data_type.name())?;
                sources.push(factory.create_source(spec)?);
            }
        }
        if spec.is_nullable() {
            sources.push(Box::new(NullSource));
        }
        Ok(sources)
    }
}

/// Types the spec can produce: declared type restrictions intersected
/// with the types its typed restriction slots imply. A spec with no
/// typed slots implies every type.
fn allowed_types(spec: &FieldSpec) -> Vec<DataType> {
    let mut implied = Vec::new();
    if spec.numeric().is_some() {
        implied.push(DataType::Numeric);
    }
    if spec.string().is_some() {
        implied.push(DataType::String);
    }
    if spec.datetime().is_some() {
        implied.push(DataType::DateTime);
    }
    if implied.is_empty() {
        implied = DataType::ALL.to_vec();
    }
    implied
        .into_iter()
        .filter(|data_type| spec.types().is_none_or(|types| types.is_allowed(*data_type)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restrictions::{NumericRestrictions, TypeRestrictions};

    #[test]
    fn typed_slots_narrow_the_implied_types() {
        let spec = FieldSpec::empty().with_numeric(NumericRestrictions::granular_to(2));
        assert_eq!(allowed_types(&spec), vec![DataType::Numeric]);

        let spec = FieldSpec::empty().with_types(TypeRestrictions::of(DataType::DateTime));
        assert_eq!(allowed_types(&spec), vec![DataType::DateTime]);
    }

    #[test]
    fn unknown_source_name_is_a_config_error() {
        let registry = SourceFactoryRegistry::new();
        assert!(matches!(
            registry.resolve("numeric"),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_whitelist_with_nullability_yields_only_the_null_source() {
        let evaluator = FieldSpecSourceEvaluator::standard();
        let sources = evaluator.sources_for(&FieldSpec::must_be_null()).unwrap();
        assert_eq!(sources.len(), 1);
        let values: Vec<DataValue> = sources[0].all_values().collect();
        assert_eq!(values, vec![DataValue::Null]);
    }
}
