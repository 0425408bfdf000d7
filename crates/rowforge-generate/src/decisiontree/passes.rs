//! Whole-tree passes run before walking.

use std::collections::BTreeMap;

use rowforge_core::Field;

use crate::decisiontree::{ConstraintNode, DecisionTree};
use crate::errors::GenerationError;
use crate::fieldspecs::{FieldSpec, FieldSpecFactory};
use crate::reducer::ConstraintReducer;
use crate::walker::reductive::{Merged, ReductiveTreePruner};

/// Splits a tree into independently walkable subtrees.
///
/// Splitting is a throughput aid, not a correctness requirement, and
/// the stock partitioner returns the tree whole.
#[derive(Debug, Clone, Default)]
pub struct TreePartitioner;

impl TreePartitioner {
    pub fn new() -> Self {
        Self
    }

    pub fn partition(&self, tree: &DecisionTree) -> Vec<DecisionTree> {
        vec![tree.clone()]
    }
}

/// Structural simplification between partitioning and walking.
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeOptimiser;

impl DecisionTreeOptimiser {
    pub fn new() -> Self {
        Self
    }

    /// Currently the identity transform.
    pub fn optimise(&self, tree: DecisionTree) -> DecisionTree {
        tree
    }
}

/// Rejects trees no row can ever satisfy, and surfaces profile faults
/// before any walking starts.
#[derive(Debug, Clone, Default)]
pub struct ContradictionTreeValidator {
    factory: FieldSpecFactory,
    reducer: ConstraintReducer,
    pruner: ReductiveTreePruner,
}

impl ContradictionTreeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` when the whole tree is contradictory.
    ///
    /// Every constraint in the tree is compiled here, so faults such as
    /// invalid patterns fail the run instead of degrading streams later.
    pub fn validate(&self, tree: &DecisionTree) -> Result<Option<DecisionTree>, GenerationError> {
        self.compile_all(tree.root())?;
        let Some(root_specs) = self
            .reducer
            .reduce(tree.fields(), tree.root().constraints())?
        else {
            return Ok(None);
        };
        // Pinning the root's own specs lets the pruner see options that
        // contradict them, not just options contradicting themselves.
        let mut pinned: BTreeMap<Field, FieldSpec> = tree
            .fields()
            .iter()
            .map(|field| (field.clone(), FieldSpec::empty()))
            .collect();
        for (field, spec) in root_specs.specs() {
            pinned.insert(field.clone(), spec.clone());
        }
        match self.pruner.prune(tree.root(), &pinned)? {
            Merged::Value(_) => Ok(Some(tree.clone())),
            Merged::Contradictory => Ok(None),
        }
    }

    fn compile_all(&self, node: &ConstraintNode) -> Result<(), GenerationError> {
        for constraint in node.constraints() {
            self.factory.construct(constraint)?;
        }
        for decision in node.decisions() {
            for option in decision.options() {
                self.compile_all(option)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisiontree::DecisionNode;
    use rowforge_core::{AtomicConstraint, ConstraintKind, DataType, ProfileFields};

    fn typed(field: &str, data_type: DataType) -> AtomicConstraint {
        AtomicConstraint::new(Field::new(field), ConstraintKind::OfType(data_type))
    }

    #[test]
    fn a_satisfiable_tree_passes_through() {
        let tree = DecisionTree::new(
            ProfileFields::from_names(["price"]),
            ConstraintNode::from_constraints(vec![typed("price", DataType::Numeric)]),
        );
        let validator = ContradictionTreeValidator::new();
        assert_eq!(validator.validate(&tree).unwrap(), Some(tree));
    }

    #[test]
    fn contradictory_root_constraints_reject_the_tree() {
        let tree = DecisionTree::new(
            ProfileFields::from_names(["price"]),
            ConstraintNode::from_constraints(vec![
                typed("price", DataType::Numeric),
                typed("price", DataType::String),
            ]),
        );
        let validator = ContradictionTreeValidator::new();
        assert_eq!(validator.validate(&tree).unwrap(), None);
    }

    #[test]
    fn a_decision_whose_options_all_contradict_rejects_the_tree() {
        let root_constraint = typed("price", DataType::Numeric);
        let decision = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![typed("price", DataType::String)]),
            ConstraintNode::from_constraints(vec![
                typed("price", DataType::DateTime),
                typed("price", DataType::String),
            ]),
        ]);
        let tree = DecisionTree::new(
            ProfileFields::from_names(["price"]),
            ConstraintNode::new(vec![root_constraint], vec![decision]),
        );
        let validator = ContradictionTreeValidator::new();
        assert_eq!(validator.validate(&tree).unwrap(), None);
    }

    #[test]
    fn invalid_patterns_fail_validation_outright() {
        let tree = DecisionTree::new(
            ProfileFields::from_names(["code"]),
            ConstraintNode::from_constraints(vec![AtomicConstraint::new(
                Field::new("code"),
                ConstraintKind::MatchesRegex("[unclosed".into()),
            )]),
        );
        let validator = ContradictionTreeValidator::new();
        assert!(matches!(
            validator.validate(&tree),
            Err(GenerationError::InvalidProfile(_))
        ));
    }

    #[test]
    fn the_partitioner_returns_the_tree_whole() {
        let tree = DecisionTree::new(
            ProfileFields::from_names(["price"]),
            ConstraintNode::from_constraints(vec![typed("price", DataType::Numeric)]),
        );
        assert_eq!(TreePartitioner::new().partition(&tree), vec![tree]);
    }
}
