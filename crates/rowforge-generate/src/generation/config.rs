//! Generation run configuration.

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// How field values are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    #[default]
    FullSequential,
    Random,
}

/// How the decision tree is explored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeWalkerType {
    #[default]
    CartesianProduct,
    Reductive,
}

/// How per-field streams are joined into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationStrategyType {
    #[default]
    Exhaustive,
    Minimal,
}

/// Declarative settings for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub generation_type: GenerationType,
    pub walker_type: TreeWalkerType,
    pub combination_strategy: CombinationStrategyType,
    pub max_rows: Option<u64>,
    pub seed: Option<u64>,
}

impl GenerationConfig {
    /// Reads a config from loose JSON, tolerating absent keys.
    pub fn from_value(value: serde_json::Value) -> Result<Self, GenerationError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Read side of the configuration, so callers can back settings with any
/// store they like.
pub trait GenerationConfigSource {
    fn generation_type(&self) -> GenerationType;
    fn walker_type(&self) -> TreeWalkerType;
    fn combination_strategy(&self) -> CombinationStrategyType;
    fn max_rows(&self) -> Option<u64>;
    fn seed(&self) -> Option<u64>;
}

impl GenerationConfigSource for GenerationConfig {
    fn generation_type(&self) -> GenerationType {
        self.generation_type
    }

    fn walker_type(&self) -> TreeWalkerType {
        self.walker_type
    }

    fn combination_strategy(&self) -> CombinationStrategyType {
        self.combination_strategy
    }

    fn max_rows(&self) -> Option<u64> {
        self.max_rows
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = GenerationConfig::from_value(json!({
            "generation_type": "random",
            "max_rows": 50
        }))
        .unwrap();
        assert_eq!(config.generation_type, GenerationType::Random);
        assert_eq!(config.walker_type, TreeWalkerType::CartesianProduct);
        assert_eq!(config.combination_strategy, CombinationStrategyType::Exhaustive);
        assert_eq!(config.max_rows, Some(50));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn unknown_variant_is_a_json_error() {
        let result = GenerationConfig::from_value(json!({
            "walker_type": "depth_first"
        }));
        assert!(matches!(result, Err(GenerationError::Json(_))));
    }
}
