//! Entity-level metrics for BIO-tagged sequences.
//!
//! A field is only counted as correct when its predicted span covers exactly the same words as
//! the true span, with the same type. Scores come from `rusev`; token accuracy is reported
//! alongside, since it is what Burn's learner tracks during training. The chunker in [`entity`]
//! keeps word positions, which field extraction needs to slice values out of the raw line.

/// Chunking tag sequences into entities
pub mod entity;

/// Precision, recall and F1 reports
pub mod report;

pub use entity::{get_entities, Entity};
pub use report::{accuracy_score, ClassMetrics, Report};
