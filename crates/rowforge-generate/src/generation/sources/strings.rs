//! String source backed by the string generator.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;

use rowforge_core::DataValue;

use crate::errors::GenerationError;
use crate::fieldspecs::FieldSpec;
use crate::generation::sources::{FieldValueSource, ValueIterator};
use crate::strings::StringGenerator;

/// Emits strings admitted by the spec's string restrictions, minus any
/// blacklisted exact values.
pub struct StringValueSource {
    generator: StringGenerator,
}

impl StringValueSource {
    pub fn from_spec(spec: &FieldSpec) -> Result<Self, GenerationError> {
        let excluded: BTreeSet<String> = spec
            .blacklist()
            .map(|blacklist| {
                blacklist
                    .values
                    .iter()
                    .filter_map(|value| value.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            generator: StringGenerator::from_restrictions(spec.string(), excluded)?,
        })
    }
}

impl FieldValueSource for StringValueSource {
    fn all_values(&self) -> ValueIterator {
        Box::new(self.generator.all_values().map(DataValue::String))
    }

    fn random_values(&self, rng: ChaCha8Rng) -> ValueIterator {
        Box::new(self.generator.random_values(rng).map(DataValue::String))
    }
}
