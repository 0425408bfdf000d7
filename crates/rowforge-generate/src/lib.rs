//! Constraint-driven test data generation for rowforge.
//!
//! This crate compiles atomic constraints into field specs, arranges them
//! in decision trees, and walks those trees to produce row streams that
//! satisfy every constraint.

pub mod decisiontree;
pub mod defaults;
pub mod errors;
pub mod fieldspecs;
pub mod generation;
pub mod reducer;
pub mod restrictions;
pub mod strings;
pub mod walker;

pub use decisiontree::{ConstraintNode, DecisionNode, DecisionTree};
pub use errors::GenerationError;
pub use fieldspecs::{FieldSpec, RowSpec};
pub use generation::{DataBag, DecisionTreeDataGenerator, GenerationConfig};
pub use reducer::ConstraintReducer;
