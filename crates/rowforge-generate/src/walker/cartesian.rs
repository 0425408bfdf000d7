//! Exhaustive tree walking via cartesian products of decisions.

use std::rc::Rc;

use rowforge_core::ProfileFields;

use crate::decisiontree::{ConstraintNode, DecisionTree};
use crate::errors::GenerationError;
use crate::fieldspecs::{RowSpec, RowSpecMerger};
use crate::generation::databags::DataBagIterator;
use crate::generation::generator::RowSpecDataBagGenerator;
use crate::reducer::ConstraintReducer;
use crate::walker::DecisionTreeWalker;

/// Visits every satisfiable combination of decision options, merging
/// each combination into a row spec and generating its rows.
///
/// Option lists are materialised per decision; the cross product over
/// them is not, so capped streams stop early.
#[derive(Clone)]
pub struct RowSpecTreeWalker {
    generator: Rc<RowSpecDataBagGenerator>,
    reducer: ConstraintReducer,
}

impl RowSpecTreeWalker {
    pub fn new(generator: Rc<RowSpecDataBagGenerator>) -> Self {
        Self {
            generator,
            reducer: ConstraintReducer::new(),
        }
    }

    /// Row specs of the tree, in decision order.
    pub fn row_specs(
        &self,
        tree: &DecisionTree,
    ) -> Result<Box<dyn Iterator<Item = RowSpec>>, GenerationError> {
        Ok(Box::new(self.specs_of_node(tree.fields(), tree.root())?))
    }

    fn specs_of_node(
        &self,
        fields: &ProfileFields,
        node: &ConstraintNode,
    ) -> Result<RowSpecCrossJoin, GenerationError> {
        let Some(base) = self.reducer.reduce(fields, node.constraints())? else {
            return Ok(RowSpecCrossJoin::empty());
        };
        let mut decision_lists = Vec::with_capacity(node.decisions().len());
        for decision in node.decisions() {
            let mut options = Vec::new();
            for option in decision.options() {
                options.extend(self.specs_of_node(fields, option)?);
            }
            // A decision with no satisfiable option sinks the node.
            if options.is_empty() {
                return Ok(RowSpecCrossJoin::empty());
            }
            decision_lists.push(options);
        }
        Ok(RowSpecCrossJoin::new(base, decision_lists))
    }
}

impl DecisionTreeWalker for RowSpecTreeWalker {
    fn walk(&self, tree: &DecisionTree) -> Result<DataBagIterator, GenerationError> {
        let specs = self.row_specs(tree)?;
        let generator = Rc::clone(&self.generator);
        Ok(Box::new(
            specs.flat_map(move |row_spec| generator.generate(&row_spec)),
        ))
    }
}

/// Odometer over one option pick per decision. Combinations whose merge
/// is contradictory are skipped.
struct RowSpecCrossJoin {
    base: RowSpec,
    decision_lists: Vec<Vec<RowSpec>>,
    indices: Vec<usize>,
    merger: RowSpecMerger,
    done: bool,
}

impl RowSpecCrossJoin {
    fn new(base: RowSpec, decision_lists: Vec<Vec<RowSpec>>) -> Self {
        let indices = vec![0; decision_lists.len()];
        Self {
            base,
            decision_lists,
            indices,
            merger: RowSpecMerger::new(),
            done: false,
        }
    }

    fn empty() -> Self {
        Self {
            base: RowSpec::unrestricted(ProfileFields::new(Vec::new())),
            decision_lists: Vec::new(),
            indices: Vec::new(),
            merger: RowSpecMerger::new(),
            done: true,
        }
    }

    fn current(&self) -> Option<RowSpec> {
        let mut merged = self.base.clone();
        for (list, &index) in self.decision_lists.iter().zip(&self.indices) {
            merged = self.merger.merge(&merged, &list[index])?;
        }
        Some(merged)
    }

    /// Rightmost decision varies fastest.
    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.decision_lists[position].len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.done = true;
    }
}

impl Iterator for RowSpecCrossJoin {
    type Item = RowSpec;

    fn next(&mut self) -> Option<RowSpec> {
        while !self.done {
            let candidate = self.current();
            self.advance();
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisiontree::DecisionNode;
    use crate::generation::combination::ExhaustiveCombinationStrategy;
    use crate::generation::config::GenerationType;
    use crate::generation::generator::FieldSpecValueGenerator;
    use crate::generation::sources::FieldSpecSourceEvaluator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rowforge_core::{AtomicConstraint, ConstraintKind, DataValue, Field};

    fn walker() -> RowSpecTreeWalker {
        RowSpecTreeWalker::new(Rc::new(RowSpecDataBagGenerator::new(
            FieldSpecValueGenerator::new(
                GenerationType::FullSequential,
                FieldSpecSourceEvaluator::standard(),
                ChaCha8Rng::seed_from_u64(11),
            ),
            Box::new(ExhaustiveCombinationStrategy::new()),
        )))
    }

    fn must_be(field: &str, value: &str) -> AtomicConstraint {
        AtomicConstraint::new(
            Field::new(field),
            ConstraintKind::InSet(vec![DataValue::from(value)]),
        )
    }

    #[test]
    fn every_option_combination_becomes_a_row_spec() {
        let fields = ProfileFields::from_names(["kind", "venue"]);
        let kinds = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![must_be("kind", "bond")]),
            ConstraintNode::from_constraints(vec![must_be("kind", "equity")]),
        ]);
        let venues = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![must_be("venue", "LSE")]),
            ConstraintNode::from_constraints(vec![must_be("venue", "NYSE")]),
        ]);
        let tree = DecisionTree::new(fields, ConstraintNode::new(vec![], vec![kinds, venues]));

        let specs: Vec<RowSpec> = walker().row_specs(&tree).unwrap().collect();
        assert_eq!(specs.len(), 4);
        // Rightmost decision varies fastest.
        let venues_seen: Vec<String> = specs
            .iter()
            .map(|spec| {
                spec.spec_for(&Field::new("venue"))
                    .and_then(|s| s.whitelist())
                    .and_then(|w| w.values().next().cloned())
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default()
            })
            .collect();
        assert_eq!(venues_seen, ["LSE", "NYSE", "LSE", "NYSE"]);
    }

    #[test]
    fn contradictory_combinations_are_skipped() {
        let fields = ProfileFields::from_names(["kind"]);
        let first = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![must_be("kind", "bond")]),
            ConstraintNode::from_constraints(vec![must_be("kind", "equity")]),
        ]);
        let second = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![must_be("kind", "equity")]),
        ]);
        let tree = DecisionTree::new(fields, ConstraintNode::new(vec![], vec![first, second]));

        let specs: Vec<RowSpec> = walker().row_specs(&tree).unwrap().collect();
        // bond x equity contradicts and disappears.
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn nested_decisions_multiply_through_their_parent_option() {
        let fields = ProfileFields::from_names(["kind", "venue"]);
        let nested = DecisionNode::new(vec![
            ConstraintNode::from_constraints(vec![must_be("venue", "LSE")]),
            ConstraintNode::from_constraints(vec![must_be("venue", "NYSE")]),
        ]);
        let outer = DecisionNode::new(vec![
            ConstraintNode::new(vec![must_be("kind", "equity")], vec![nested]),
            ConstraintNode::from_constraints(vec![must_be("kind", "bond")]),
        ]);
        let tree = DecisionTree::new(fields, ConstraintNode::new(vec![], vec![outer]));

        let specs: Vec<RowSpec> = walker().row_specs(&tree).unwrap().collect();
        // equity/LSE, equity/NYSE, bond.
        assert_eq!(specs.len(), 3);
    }

    #[test]
    fn a_decision_with_no_satisfiable_options_yields_nothing() {
        let fields = ProfileFields::from_names(["kind"]);
        let impossible = DecisionNode::new(vec![ConstraintNode::from_constraints(vec![
            must_be("kind", "bond"),
            must_be("kind", "equity"),
        ])]);
        let tree = DecisionTree::new(fields, ConstraintNode::new(vec![], vec![impossible]));

        let rows: Vec<_> = walker().walk(&tree).unwrap().collect();
        assert!(rows.is_empty());
    }
}
