//! Decision tree walkers.

pub mod cartesian;
pub mod reductive;
pub mod restarting;

pub use cartesian::RowSpecTreeWalker;
pub use reductive::{Merged, ReductiveDecisionTreeWalker, ReductiveTreePruner};
pub use restarting::RestartingDecisionTreeWalker;

use std::rc::Rc;

use rand_chacha::ChaCha8Rng;

use crate::decisiontree::DecisionTree;
use crate::errors::GenerationError;
use crate::generation::config::{GenerationConfigSource, GenerationType, TreeWalkerType};
use crate::generation::databags::DataBagIterator;
use crate::generation::generator::RowSpecDataBagGenerator;

/// Explores a decision tree, yielding generated rows.
///
/// Setup work is eager so profile faults surface as errors; the returned
/// iteration is lazy.
pub trait DecisionTreeWalker {
    fn walk(&self, tree: &DecisionTree) -> Result<DataBagIterator, GenerationError>;
}

/// Assembles the walking stack a config source asks for. Random
/// generation wraps the walker so each row comes from a fresh walk.
pub fn walker_from_config(
    config: &dyn GenerationConfigSource,
    generator: Rc<RowSpecDataBagGenerator>,
    rng: ChaCha8Rng,
) -> Box<dyn DecisionTreeWalker> {
    match config.walker_type() {
        TreeWalkerType::Reductive => {
            let walker = ReductiveDecisionTreeWalker::new(generator, rng);
            match config.generation_type() {
                GenerationType::Random => Box::new(RestartingDecisionTreeWalker::new(walker)),
                GenerationType::FullSequential => Box::new(walker),
            }
        }
        TreeWalkerType::CartesianProduct => {
            let walker = RowSpecTreeWalker::new(generator);
            match config.generation_type() {
                GenerationType::Random => Box::new(RestartingDecisionTreeWalker::new(walker)),
                GenerationType::FullSequential => Box::new(walker),
            }
        }
    }
}
