//! Decision trees: conjunction nodes of constraints with embedded
//! disjunction decisions.

pub mod passes;

pub use passes::{ContradictionTreeValidator, DecisionTreeOptimiser, TreePartitioner};

use std::collections::BTreeSet;

use rowforge_core::{AtomicConstraint, Field, ProfileFields};

/// Conjunction node: every constraint must hold, and for every decision
/// at least one option must hold.
///
/// Nodes are immutable; structural edits build new nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintNode {
    constraints: Vec<AtomicConstraint>,
    decisions: Vec<DecisionNode>,
}

impl ConstraintNode {
    pub fn new(constraints: Vec<AtomicConstraint>, decisions: Vec<DecisionNode>) -> Self {
        Self {
            constraints,
            decisions,
        }
    }

    pub fn from_constraints(constraints: Vec<AtomicConstraint>) -> Self {
        Self {
            constraints,
            decisions: Vec::new(),
        }
    }

    pub fn constraints(&self) -> &[AtomicConstraint] {
        &self.constraints
    }

    pub fn decisions(&self) -> &[DecisionNode] {
        &self.decisions
    }

    pub fn has_decisions(&self) -> bool {
        !self.decisions.is_empty()
    }

    /// This node with one decision removed.
    pub fn without_decision_at(&self, index: usize) -> Self {
        let mut decisions = self.decisions.clone();
        decisions.remove(index);
        Self {
            constraints: self.constraints.clone(),
            decisions,
        }
    }

    /// This node with extra constraints conjoined; duplicates are kept
    /// out so repeated resolution steps stay idempotent.
    pub fn adding_constraints(
        &self,
        extra: impl IntoIterator<Item = AtomicConstraint>,
    ) -> Self {
        let mut constraints = self.constraints.clone();
        for constraint in extra {
            if !constraints.contains(&constraint) {
                constraints.push(constraint);
            }
        }
        Self {
            constraints,
            decisions: self.decisions.clone(),
        }
    }

    pub fn adding_decisions(&self, extra: impl IntoIterator<Item = DecisionNode>) -> Self {
        let mut decisions = self.decisions.clone();
        decisions.extend(extra);
        Self {
            constraints: self.constraints.clone(),
            decisions,
        }
    }

    /// Fields named by this node's own constraints.
    pub fn constrained_fields(&self) -> BTreeSet<Field> {
        self.constraints
            .iter()
            .map(|constraint| constraint.field.clone())
            .collect()
    }
}

/// Disjunction: one of the options must hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNode {
    options: Vec<ConstraintNode>,
}

impl DecisionNode {
    pub fn new(options: Vec<ConstraintNode>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[ConstraintNode] {
        &self.options
    }
}

/// A compiled profile: the declared fields and the root conjunction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    fields: ProfileFields,
    root: ConstraintNode,
}

impl DecisionTree {
    pub fn new(fields: ProfileFields, root: ConstraintNode) -> Self {
        Self { fields, root }
    }

    pub fn fields(&self) -> &ProfileFields {
        &self.fields
    }

    pub fn root(&self) -> &ConstraintNode {
        &self.root
    }

    pub fn with_root(&self, root: ConstraintNode) -> Self {
        Self {
            fields: self.fields.clone(),
            root,
        }
    }
}
