//! The generation engine: validates a tree, walks it, and streams rows.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::decisiontree::{
    ContradictionTreeValidator, DecisionTree, DecisionTreeOptimiser, TreePartitioner,
};
use crate::defaults::DEFAULT_ROW_LIMIT;
use crate::errors::GenerationError;
use crate::generation::combination::{
    CombinationStrategy, ExhaustiveCombinationStrategy, MinimalCombinationStrategy,
};
use crate::generation::config::{CombinationStrategyType, GenerationConfigSource, GenerationType};
use crate::generation::databags::{DataBag, DataBagIterator};
use crate::generation::generator::{FieldSpecValueGenerator, RowSpecDataBagGenerator};
use crate::generation::monitor::{GenerationMonitor, NoopGenerationMonitor};
use crate::generation::sources::FieldSpecSourceEvaluator;
use crate::walker::{walker_from_config, DecisionTreeWalker};

/// Generates rows for a decision tree.
///
/// Assembled once per run; `generate_data` may be called for any number
/// of trees.
pub struct DecisionTreeDataGenerator {
    walker: Box<dyn DecisionTreeWalker>,
    partitioner: TreePartitioner,
    optimiser: DecisionTreeOptimiser,
    validator: ContradictionTreeValidator,
    combination: Box<dyn CombinationStrategy>,
    monitor: Rc<dyn GenerationMonitor>,
    max_rows: Option<u64>,
}

impl DecisionTreeDataGenerator {
    pub fn new(
        walker: Box<dyn DecisionTreeWalker>,
        combination: Box<dyn CombinationStrategy>,
        max_rows: Option<u64>,
    ) -> Self {
        Self {
            walker,
            partitioner: TreePartitioner::new(),
            optimiser: DecisionTreeOptimiser::new(),
            validator: ContradictionTreeValidator::new(),
            combination,
            monitor: Rc::new(NoopGenerationMonitor),
            max_rows,
        }
    }

    /// The standard stack for a config source.
    ///
    /// A missing seed draws one at random, so runs are reproducible only
    /// when the config pins a seed. Random generation without a row cap
    /// would stream forever and is capped at the default row limit.
    pub fn from_config(config: &dyn GenerationConfigSource) -> Self {
        let seed = config.seed().unwrap_or_else(|| rand::rng().random());
        let generation_type = config.generation_type();

        let value_generator = FieldSpecValueGenerator::new(
            generation_type,
            FieldSpecSourceEvaluator::standard(),
            ChaCha8Rng::seed_from_u64(hash_seed(seed, "values")),
        );
        let row_generator = Rc::new(RowSpecDataBagGenerator::new(
            value_generator,
            combination_of(config.combination_strategy()),
        ));
        let walker = walker_from_config(
            config,
            row_generator,
            ChaCha8Rng::seed_from_u64(hash_seed(seed, "walker")),
        );

        let max_rows = match (generation_type, config.max_rows()) {
            (GenerationType::Random, None) => Some(DEFAULT_ROW_LIMIT),
            (_, configured) => configured,
        };
        debug!(seed, ?max_rows, "assembled generation stack");
        Self::new(walker, combination_of(config.combination_strategy()), max_rows)
    }

    pub fn with_monitor(mut self, monitor: Rc<dyn GenerationMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Lazy row stream for a tree.
    ///
    /// A contradictory tree yields an empty stream. `Err` is reserved
    /// for profile and configuration faults.
    pub fn generate_data(&self, tree: &DecisionTree) -> Result<DataBagIterator, GenerationError> {
        let Some(tree) = self.validator.validate(tree)? else {
            info!("profile is wholly contradictory, emitting no rows");
            self.monitor.generation_starting();
            self.monitor.generation_ending();
            return Ok(Box::new(std::iter::empty()));
        };

        let partitions = self.partitioner.partition(&tree);
        let mut streams: Vec<DataBagIterator> = Vec::with_capacity(partitions.len());
        for partition in partitions {
            let optimised = self.optimiser.optimise(partition);
            streams.push(self.walker.walk(&optimised)?);
        }
        let combined = if streams.len() == 1 {
            match streams.pop() {
                Some(only) => only,
                None => Box::new(std::iter::empty()),
            }
        } else {
            self.combination.permute(streams)
        };
        let capped: DataBagIterator = match self.max_rows {
            Some(limit) => Box::new(combined.take(limit as usize)),
            None => combined,
        };

        self.monitor.generation_starting();
        Ok(Box::new(MonitoredRows {
            rows: capped,
            monitor: Rc::clone(&self.monitor),
            ended: false,
        }))
    }
}

/// Reports each row to the monitor and the end of the stream once.
struct MonitoredRows {
    rows: DataBagIterator,
    monitor: Rc<dyn GenerationMonitor>,
    ended: bool,
}

impl Iterator for MonitoredRows {
    type Item = DataBag;

    fn next(&mut self) -> Option<DataBag> {
        match self.rows.next() {
            Some(row) => {
                self.monitor.row_emitted();
                Some(row)
            }
            None => {
                if !self.ended {
                    self.ended = true;
                    self.monitor.generation_ending();
                }
                None
            }
        }
    }
}

fn combination_of(strategy: CombinationStrategyType) -> Box<dyn CombinationStrategy> {
    match strategy {
        CombinationStrategyType::Exhaustive => Box::new(ExhaustiveCombinationStrategy::new()),
        CombinationStrategyType::Minimal => Box::new(MinimalCombinationStrategy::new()),
    }
}

/// FNV-1a over a stream key, so each consumer of the run seed draws an
/// independent sequence.
fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
