use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Contradictory profiles never surface here; they produce empty row
/// streams. This enum covers configuration and profile faults that must
/// stop a run before it starts.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    #[error("unsupported feature: {0}")]
    Unsupported(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] rowforge_core::Error),
}
