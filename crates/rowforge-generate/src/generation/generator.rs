//! Turns row specs into per-field cell streams and whole rows.

use std::cell::RefCell;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use rowforge_core::{DataValue, Field};

use crate::fieldspecs::{FieldSpec, RowSpec};
use crate::generation::combination::CombinationStrategy;
use crate::generation::config::GenerationType;
use crate::generation::databags::{DataBag, DataBagIterator, DataBagValue};
use crate::generation::sources::{FieldSpecSourceEvaluator, ValueIterator};

/// Produces the cell stream for one field under one spec.
///
/// Sequential generation chains every source's exhaustive values; random
/// generation draws each pull from a randomly selected source. Each
/// stream gets its own child RNG seeded from the generator's, so streams
/// stay independent under one seed.
pub struct FieldSpecValueGenerator {
    generation_type: GenerationType,
    evaluator: FieldSpecSourceEvaluator,
    rng: RefCell<ChaCha8Rng>,
}

impl FieldSpecValueGenerator {
    pub fn new(
        generation_type: GenerationType,
        evaluator: FieldSpecSourceEvaluator,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            generation_type,
            evaluator,
            rng: RefCell::new(rng),
        }
    }

    /// Single-field bag stream for the spec.
    ///
    /// Source construction problems surface when the tree is validated;
    /// one reached mid-run degrades to an empty stream with a warning.
    pub fn generate(&self, field: &Field, spec: &FieldSpec) -> DataBagIterator {
        let sources = match self.evaluator.sources_for(spec) {
            Ok(sources) => sources,
            Err(err) => {
                warn!(field = %field, error = %err, "cannot build value sources, emitting nothing");
                return Box::new(std::iter::empty());
            }
        };
        let values: ValueIterator = match self.generation_type {
            GenerationType::FullSequential => {
                let mut chained: ValueIterator = Box::new(std::iter::empty());
                for source in &sources {
                    chained = Box::new(chained.chain(source.all_values()));
                }
                chained
            }
            GenerationType::Random => {
                let mut rng = self.rng.borrow_mut();
                let streams: Vec<ValueIterator> = sources
                    .iter()
                    .map(|source| {
                        let seed = rng.next_u64();
                        source.random_values(ChaCha8Rng::seed_from_u64(seed))
                    })
                    .collect();
                let picker = ChaCha8Rng::seed_from_u64(rng.next_u64());
                Box::new(RandomMergingIter {
                    streams,
                    rng: picker,
                })
            }
        };
        let field = field.clone();
        let formatting = spec.formatting().map(str::to_string);
        let provenance = spec.source().clone();
        Box::new(values.map(move |value| {
            DataBag::empty().with_value(
                field.clone(),
                DataBagValue::new(value, formatting.clone(), provenance.clone()),
            )
        }))
    }
}

/// Draws each pull from a randomly chosen stream, dropping exhausted
/// streams until none remain.
struct RandomMergingIter {
    streams: Vec<ValueIterator>,
    rng: ChaCha8Rng,
}

impl Iterator for RandomMergingIter {
    type Item = DataValue;

    fn next(&mut self) -> Option<DataValue> {
        while !self.streams.is_empty() {
            let index = if self.streams.len() == 1 {
                0
            } else {
                self.rng.random_range(0..self.streams.len())
            };
            match self.streams[index].next() {
                Some(value) => return Some(value),
                None => {
                    self.streams.remove(index);
                }
            }
        }
        None
    }
}

/// Combines a row spec's per-field streams into whole rows.
pub struct RowSpecDataBagGenerator {
    value_generator: FieldSpecValueGenerator,
    combination: Box<dyn CombinationStrategy>,
}

impl RowSpecDataBagGenerator {
    pub fn new(
        value_generator: FieldSpecValueGenerator,
        combination: Box<dyn CombinationStrategy>,
    ) -> Self {
        Self {
            value_generator,
            combination,
        }
    }

    pub fn generate(&self, row_spec: &RowSpec) -> DataBagIterator {
        let streams: Vec<DataBagIterator> = row_spec
            .fields()
            .iter()
            .map(|field| {
                let spec = row_spec.spec_or_empty(field);
                self.value_generator.generate(field, &spec)
            })
            .collect();
        self.combination.permute(streams)
    }
}
