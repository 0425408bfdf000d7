//! Whitelist-backed source.

use rand_chacha::ChaCha8Rng;

use rowforge_core::DataValue;

use crate::fieldspecs::Whitelist;
use crate::generation::sources::{FieldValueSource, ValueIterator};

/// Emits exactly the whitelisted values; random draws follow the
/// whitelist weights.
#[derive(Debug, Clone)]
pub struct CannedValuesSource {
    whitelist: Whitelist,
}

impl CannedValuesSource {
    pub fn new(whitelist: Whitelist) -> Self {
        Self { whitelist }
    }
}

impl FieldValueSource for CannedValuesSource {
    fn all_values(&self) -> ValueIterator {
        let values: Vec<DataValue> = self.whitelist.values().cloned().collect();
        Box::new(values.into_iter())
    }

    fn random_values(&self, rng: ChaCha8Rng) -> ValueIterator {
        Box::new(RandomCanned {
            whitelist: self.whitelist.clone(),
            rng,
        })
    }
}

struct RandomCanned {
    whitelist: Whitelist,
    rng: ChaCha8Rng,
}

impl Iterator for RandomCanned {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        self.whitelist.pick_random(&mut self.rng).cloned()
    }
}
