//! Typed restriction payloads and their pairwise mergers.
//!
//! Each category merges commutatively. A contradiction is an ordinary
//! [`MergeResult::Contradiction`] value, never an error.

pub mod blacklist;
pub mod datetime;
pub mod numeric;
pub mod string;
pub mod types;

pub use blacklist::BlacklistRestrictions;
pub use datetime::{DateTimeLimit, DateTimeRestrictions};
pub use numeric::{NumericLimit, NumericRestrictions};
pub use string::{StringRestrictions, TextualRestrictions};
pub use types::TypeRestrictions;

/// Outcome of merging two restriction payloads of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult<T> {
    Success(T),
    /// The payloads admit no common value.
    Contradiction,
}

impl<T> MergeResult<T> {
    pub fn is_contradiction(&self) -> bool {
        matches!(self, MergeResult::Contradiction)
    }

    /// `Some` on success, `None` on contradiction.
    pub fn ok(self) -> Option<T> {
        match self {
            MergeResult::Success(value) => Some(value),
            MergeResult::Contradiction => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MergeResult<U> {
        match self {
            MergeResult::Success(value) => MergeResult::Success(f(value)),
            MergeResult::Contradiction => MergeResult::Contradiction,
        }
    }
}
