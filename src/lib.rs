//! # Burn Log Parser
//!
//! Fine-tunes a pretrained BERT model to label the tokens of Apache server log lines with the
//! field they belong to, turning a token classifier into a trainable log parser.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// Sequence labeling metrics
pub mod metrics;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
