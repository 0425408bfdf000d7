//! Core model shared by the rowforge crates.
//!
//! This crate defines the profile vocabulary: fields, values, atomic
//! constraints, datetime granularity, and the shared error type. Generation
//! logic lives in `rowforge-generate`.

pub mod constraints;
pub mod error;
pub mod fields;
pub mod granularity;
pub mod values;

pub use constraints::{AtomicConstraint, ConstraintKind, RuleInformation, StandardType};
pub use error::{Error, Result};
pub use fields::{Field, ProfileFields};
pub use granularity::DateTimeGranularity;
pub use values::{DataType, DataValue};
