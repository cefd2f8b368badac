/// CLI Indexes: Datasets
pub mod datasets;

/// CLI Indexes: Models
pub mod models;

pub use datasets::Dataset;
pub use models::Model;
