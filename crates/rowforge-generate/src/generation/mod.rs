//! Turning row specs into rows: value sources, combination, and the
//! engine that drives them.

pub mod combination;
pub mod config;
pub mod databags;
pub mod engine;
pub mod generator;
pub mod monitor;
pub mod sources;

pub use combination::{
    CombinationStrategy, ExhaustiveCombinationStrategy, MinimalCombinationStrategy,
};
pub use config::{
    CombinationStrategyType, GenerationConfig, GenerationConfigSource, GenerationType,
    TreeWalkerType,
};
pub use databags::{DataBag, DataBagIterator, DataBagValue};
pub use engine::DecisionTreeDataGenerator;
pub use generator::{FieldSpecValueGenerator, RowSpecDataBagGenerator};
pub use monitor::{GenerationMonitor, NoopGenerationMonitor, VelocityMonitor};
pub use sources::{FieldSpecSourceEvaluator, FieldValueSource, SourceFactoryRegistry};
