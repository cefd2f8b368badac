/// Word splitting and BIO label alignment
pub mod alignment;

/// Label sets and label ids
pub mod labels;

/// Pipeline and training configuration
pub mod config;

/// Common model traits for token classification
pub mod model;

/// Batcher
pub mod batcher;

/// Token Classification Items
pub mod item;

/// Model output adapted for Burn metrics
pub mod output;

/// Token Classification Training
pub mod training;

/// Token Classification Evaluation
pub mod evaluation;

/// Token Classification Inference
pub mod inference;

pub use batcher::Batcher;
pub use config::Config;
pub use evaluation::evaluate;
pub use inference::{infer, ParsedLine};
pub use item::Item;
pub use model::{Model, ModelConfig, TokenClassifier};
pub use output::Output;
pub use training::train;

/// The unique string token that identifies this pipeline
pub static PIPELINE: &str = "token-classification";
