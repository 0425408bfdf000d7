//! Random non-backtracking tree walking.
//!
//! A walk repeatedly picks a decision at random, commits to one of its
//! options at random, and prunes the remaining tree against the field
//! specs that commitment pins down. Dead ends are abandoned rather than
//! backtracked out of.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use rowforge_core::{AtomicConstraint, Field};

use crate::decisiontree::{ConstraintNode, DecisionNode, DecisionTree};
use crate::errors::GenerationError;
use crate::fieldspecs::{FieldSpec, FieldSpecMerger, RowSpec};
use crate::generation::databags::DataBagIterator;
use crate::generation::generator::RowSpecDataBagGenerator;
use crate::reducer::ConstraintReducer;
use crate::walker::DecisionTreeWalker;

/// Outcome of merging tree state with pinned field specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged<T> {
    Value(T),
    /// No row can satisfy both sides.
    Contradictory,
}

impl<T> Merged<T> {
    pub fn is_contradictory(&self) -> bool {
        matches!(self, Merged::Contradictory)
    }

    pub fn value(self) -> Option<T> {
        match self {
            Merged::Value(value) => Some(value),
            Merged::Contradictory => None,
        }
    }
}

/// Prunes a tree against field specs pinned by decisions already made.
///
/// Options that contradict the pinned specs are dropped. A decision left
/// with no options makes the whole node contradictory; a decision left
/// with exactly one option is no longer a decision, so its content is
/// folded into the node and pruning starts over.
#[derive(Debug, Clone, Default)]
pub struct ReductiveTreePruner {
    reducer: ConstraintReducer,
    merger: FieldSpecMerger,
}

impl ReductiveTreePruner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune(
        &self,
        node: &ConstraintNode,
        pinned: &BTreeMap<Field, FieldSpec>,
    ) -> Result<Merged<ConstraintNode>, GenerationError> {
        let mut current = node.clone();
        // Each fold removes one decision outright, so the restarts are
        // bounded by the decision count of the subtree.
        'restart: loop {
            if !self.constraints_survive(current.constraints(), pinned)? {
                return Ok(Merged::Contradictory);
            }
            let mut kept: Vec<DecisionNode> = Vec::new();
            for (index, decision) in current.decisions().iter().enumerate() {
                let mut surviving: Vec<ConstraintNode> = Vec::new();
                for option in decision.options() {
                    if self.constraints_survive(option.constraints(), pinned)? {
                        surviving.push(option.clone());
                    }
                }
                match surviving.len() {
                    0 => return Ok(Merged::Contradictory),
                    1 => {
                        let only = surviving.remove(0);
                        let remaining: Vec<DecisionNode> = kept
                            .iter()
                            .cloned()
                            .chain(current.decisions()[index + 1..].iter().cloned())
                            .collect();
                        current = ConstraintNode::new(current.constraints().to_vec(), remaining)
                            .adding_constraints(only.constraints().iter().cloned())
                            .adding_decisions(only.decisions().iter().cloned());
                        continue 'restart;
                    }
                    _ => kept.push(DecisionNode::new(surviving)),
                }
            }
            return Ok(Merged::Value(ConstraintNode::new(
                current.constraints().to_vec(),
                kept,
            )));
        }
    }

    /// Whether a constraint set can coexist with every pinned spec.
    ///
    /// Only pinned fields participate; constraints on other fields are
    /// not judged here.
    fn constraints_survive(
        &self,
        constraints: &[AtomicConstraint],
        pinned: &BTreeMap<Field, FieldSpec>,
    ) -> Result<bool, GenerationError> {
        for (field, pinned_spec) in pinned {
            let for_field: Vec<&AtomicConstraint> = constraints
                .iter()
                .filter(|constraint| &constraint.field == field)
                .collect();
            if for_field.is_empty() {
                continue;
            }
            let Some(reduced) = self.reducer.reduce_field(&for_field)? else {
                return Ok(false);
            };
            if self.merger.merge(pinned_spec, &reduced).is_none() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Resolves every decision by random choice, producing one row spec per
/// walk. Contradictions abandon the walk; nothing is retried here.
#[derive(Clone)]
pub struct ReductiveDecisionTreeWalker {
    generator: Rc<RowSpecDataBagGenerator>,
    pruner: ReductiveTreePruner,
    reducer: ConstraintReducer,
    rng: RefCell<ChaCha8Rng>,
}

impl ReductiveDecisionTreeWalker {
    pub fn new(generator: Rc<RowSpecDataBagGenerator>, rng: ChaCha8Rng) -> Self {
        Self {
            generator,
            pruner: ReductiveTreePruner::new(),
            reducer: ConstraintReducer::new(),
            rng: RefCell::new(rng),
        }
    }

    /// One random reduction of the tree down to a row spec. `Ok(None)`
    /// reports a dead end.
    pub fn reduce_once(&self, tree: &DecisionTree) -> Result<Option<RowSpec>, GenerationError> {
        let mut node = match self.pruner.prune(tree.root(), &BTreeMap::new())? {
            Merged::Value(node) => node,
            Merged::Contradictory => {
                warn!("tree root is contradictory, abandoning walk");
                return Ok(None);
            }
        };
        let mut rng = self.rng.borrow_mut();
        while node.has_decisions() {
            let decision_index = rng.random_range(0..node.decisions().len());
            let options = node.decisions()[decision_index].options();
            let option = options[rng.random_range(0..options.len())].clone();

            let committed = node
                .without_decision_at(decision_index)
                .adding_constraints(option.constraints().iter().cloned())
                .adding_decisions(option.decisions().iter().cloned());

            let Some(pinned) = self.pin_fields(&committed, &option)? else {
                warn!("chosen option contradicts accumulated constraints, abandoning walk");
                return Ok(None);
            };
            match self.pruner.prune(&committed, &pinned)? {
                Merged::Value(next) => node = next,
                Merged::Contradictory => {
                    warn!("pruned tree is contradictory, abandoning walk");
                    return Ok(None);
                }
            }
        }
        match self.reducer.reduce(tree.fields(), node.constraints())? {
            Some(row_spec) => Ok(Some(row_spec)),
            None => {
                warn!("resolved constraints are contradictory, abandoning walk");
                Ok(None)
            }
        }
    }

    /// Specs for the fields the chosen option constrains, reduced over
    /// everything the node now carries for them.
    fn pin_fields(
        &self,
        node: &ConstraintNode,
        option: &ConstraintNode,
    ) -> Result<Option<BTreeMap<Field, FieldSpec>>, GenerationError> {
        let mut pinned = BTreeMap::new();
        for field in option.constrained_fields() {
            let constraints: Vec<&AtomicConstraint> = node
                .constraints()
                .iter()
                .filter(|constraint| constraint.field == field)
                .collect();
            let Some(spec) = self.reducer.reduce_field(&constraints)? else {
                return Ok(None);
            };
            pinned.insert(field, spec);
        }
        Ok(Some(pinned))
    }
}

impl DecisionTreeWalker for ReductiveDecisionTreeWalker {
    fn walk(&self, tree: &DecisionTree) -> Result<DataBagIterator, GenerationError> {
        match self.reduce_once(tree)? {
            Some(row_spec) => Ok(self.generator.generate(&row_spec)),
            None => Ok(Box::new(std::iter::empty())),
        }
    }
}
