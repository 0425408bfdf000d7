use thiserror::Error;

/// Core error type shared across rowforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A constraint or lookup referenced a field the profile does not declare.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The profile violates internal invariants.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// Convenience alias for results returned by rowforge crates.
pub type Result<T> = std::result::Result<T, Error>;
