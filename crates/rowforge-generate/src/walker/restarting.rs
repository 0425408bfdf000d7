//! Fresh-walk-per-row wrapping for random generation.

use tracing::warn;

use crate::decisiontree::DecisionTree;
use crate::errors::GenerationError;
use crate::generation::databags::{DataBag, DataBagIterator};
use crate::walker::DecisionTreeWalker;

/// Walks that come up empty after at least one row was produced are
/// retried this many times before the stream gives up.
const MAX_EMPTY_RETRIES: u32 = 1_000;

/// Wraps a walker so every emitted row comes from a fresh walk.
///
/// Random value streams never advance past their first element here, so
/// repeated rows reflect repeated walks rather than one resolution of
/// the tree. An empty first walk means no walk can succeed and the
/// stream ends at once; later empty walks are dead-end resolutions and
/// are retried up to a bound.
pub struct RestartingDecisionTreeWalker<W> {
    inner: W,
}

impl<W> RestartingDecisionTreeWalker<W>
where
    W: DecisionTreeWalker + Clone + 'static,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W> DecisionTreeWalker for RestartingDecisionTreeWalker<W>
where
    W: DecisionTreeWalker + Clone + 'static,
{
    fn walk(&self, tree: &DecisionTree) -> Result<DataBagIterator, GenerationError> {
        Ok(Box::new(RestartingRows {
            walker: self.inner.clone(),
            tree: tree.clone(),
            produced_any: false,
            ended: false,
        }))
    }
}

struct RestartingRows<W> {
    walker: W,
    tree: DecisionTree,
    produced_any: bool,
    ended: bool,
}

impl<W: DecisionTreeWalker> Iterator for RestartingRows<W> {
    type Item = DataBag;

    fn next(&mut self) -> Option<DataBag> {
        if self.ended {
            return None;
        }
        let mut empty_walks = 0;
        loop {
            let mut rows = match self.walker.walk(&self.tree) {
                Ok(rows) => rows,
                Err(err) => {
                    // Setup faults were reported before iteration began;
                    // anything here ends the stream instead of panicking.
                    warn!(error = %err, "walk failed mid-stream, ending generation");
                    self.ended = true;
                    return None;
                }
            };
            if let Some(row) = rows.next() {
                self.produced_any = true;
                return Some(row);
            }
            if !self.produced_any {
                self.ended = true;
                return None;
            }
            empty_walks += 1;
            if empty_walks >= MAX_EMPTY_RETRIES {
                warn!(
                    attempts = empty_walks,
                    "giving up after repeated dead-end walks"
                );
                self.ended = true;
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use rowforge_core::{DataValue, Field, ProfileFields};

    use crate::decisiontree::ConstraintNode;
    use crate::generation::databags::DataBagValue;

    /// Yields one scripted row per walk, then empties.
    #[derive(Clone)]
    struct ScriptedWalker {
        rows: Rc<Vec<Option<DataValue>>>,
        walks: Rc<Cell<usize>>,
    }

    impl DecisionTreeWalker for ScriptedWalker {
        fn walk(&self, _tree: &DecisionTree) -> Result<DataBagIterator, GenerationError> {
            let walk_index = self.walks.get();
            self.walks.set(walk_index + 1);
            match self.rows.get(walk_index).cloned().flatten() {
                Some(value) => {
                    let bag = DataBag::empty()
                        .with_value(Field::new("id"), DataBagValue::from_value(value));
                    Ok(Box::new([bag.clone(), bag].into_iter()))
                }
                None => Ok(Box::new(std::iter::empty())),
            }
        }
    }

    fn tree() -> DecisionTree {
        DecisionTree::new(
            ProfileFields::from_names(["id"]),
            ConstraintNode::from_constraints(Vec::new()),
        )
    }

    #[test]
    fn each_row_comes_from_its_own_walk() {
        let walks = Rc::new(Cell::new(0));
        let walker = RestartingDecisionTreeWalker::new(ScriptedWalker {
            rows: Rc::new(vec![
                Some(DataValue::from(1)),
                Some(DataValue::from(2)),
                Some(DataValue::from(3)),
            ]),
            walks: Rc::clone(&walks),
        });

        let rows: Vec<DataBag> = walker.walk(&tree()).unwrap().take(3).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(walks.get(), 3);
        assert_eq!(rows[1].value_of(&Field::new("id")), Some(&DataValue::from(2)));
    }

    #[test]
    fn an_empty_first_walk_ends_the_stream() {
        let walks = Rc::new(Cell::new(0));
        let walker = RestartingDecisionTreeWalker::new(ScriptedWalker {
            rows: Rc::new(vec![None, Some(DataValue::from(1))]),
            walks: Rc::clone(&walks),
        });

        let rows: Vec<DataBag> = walker.walk(&tree()).unwrap().collect();
        assert!(rows.is_empty());
        assert_eq!(walks.get(), 1);
    }

    #[test]
    fn dead_end_walks_after_a_success_are_retried() {
        let walker = RestartingDecisionTreeWalker::new(ScriptedWalker {
            rows: Rc::new(vec![
                Some(DataValue::from(1)),
                None,
                None,
                Some(DataValue::from(2)),
            ]),
            walks: Rc::new(Cell::new(0)),
        });

        let rows: Vec<DataBag> = walker.walk(&tree()).unwrap().take(2).collect();
        assert_eq!(rows[0].value_of(&Field::new("id")), Some(&DataValue::from(1)));
        assert_eq!(rows[1].value_of(&Field::new("id")), Some(&DataValue::from(2)));
    }
}
