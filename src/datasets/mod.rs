use async_trait::async_trait;

/// Apache server logs, parsed into fields
pub mod apache;

/// A dataset which can be loaded from the top-level data directory
#[async_trait]
pub trait LoadableDataset<I>: burn::data::dataset::Dataset<I> {
    /// Load the dataset, reading raw lines from the given column
    async fn load(data_dir: &str, raw_column: &str) -> anyhow::Result<Self>
    where
        Self: std::marker::Sized;

    /// The BIO labels found in the dataset, without padding
    fn labels(&self) -> Vec<String>;
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The CSV header doesn't include the raw line column
    #[error("column {0} not found in the dataset header")]
    MissingColumn(String),

    /// The CSV header has no field columns besides the raw line
    #[error("the dataset has no field columns")]
    NoFields,

    /// The CSV has no rows
    #[error("the dataset is empty")]
    Empty,
}
