use std::io;

use async_trait::async_trait;
use burn::data::dataset::{self, Dataset as _, InMemDataset};
use csv::StringRecord;
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::pipelines::token_classification::{
    self,
    alignment::{align, pre_tokenize, Word},
    labels::bio_labels,
};

use super::{DatasetError, LoadableDataset};

/// The name of the Apache logs dataset
pub static DATASET: &str = "apache";

/// The CSV file inside the dataset directory
pub static FILE: &str = "logs.csv";

/// A log line with its words and their field labels
#[derive(Clone, Debug, Serialize, Deserialize, new)]
pub struct Item {
    /// The raw log line
    pub text: String,

    /// The pre-tokenized words of the line
    pub words: Vec<Word>,

    /// One BIO label per word
    pub labels: Vec<String>,
}

impl token_classification::Item for Item {
    fn words(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.text.as_str()).collect()
    }

    fn class_labels(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }
}

/// The column layout of a parsed log CSV: one raw line column, every other column is a field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    /// Index of the raw line column
    raw: usize,

    /// Index and name of each field column, in header order
    fields: Vec<(usize, String)>,
}

impl Schema {
    /// Derive the schema from a CSV header row
    pub fn from_header(header: &StringRecord, raw_column: &str) -> Result<Self, DatasetError> {
        let raw = header
            .iter()
            .position(|name| name.trim() == raw_column)
            .ok_or_else(|| DatasetError::MissingColumn(raw_column.to_string()))?;

        let fields: Vec<_> = header
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != raw)
            .map(|(index, name)| (index, name.trim().to_string()))
            .collect();

        if fields.is_empty() {
            return Err(DatasetError::NoFields);
        }

        Ok(Self { raw, fields })
    }

    /// The field names, in header order
    pub fn fields(&self) -> Vec<&str> {
        self.fields.iter().map(|(_, name)| name.as_str()).collect()
    }

    /// The BIO labels for this schema
    pub fn labels(&self) -> Vec<String> {
        bio_labels(&self.fields())
    }

    /// Build a labeled item from a CSV row, returning the fields that couldn't be aligned
    pub fn item(&self, record: &StringRecord) -> (Item, Vec<String>) {
        let text = record.get(self.raw).unwrap_or_default().to_string();
        let words = pre_tokenize(&text);

        let values: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(index, name)| (name.as_str(), record.get(*index).unwrap_or_default()))
            .collect();

        let alignment = align(&words, &values);

        (Item::new(text, words, alignment.labels), alignment.misses)
    }
}

/// Struct for the Apache logs dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,

    /// The column layout the items were derived from
    pub schema: Schema,
}

/// Implement the Dataset trait for the Apache logs dataset
impl dataset::Dataset<Item> for Dataset {
    /// Returns a specific item from the dataset
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    /// Returns the length of the dataset
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

// Implement methods for constructing the Apache logs dataset
impl Dataset {
    /// Read and label a parsed log CSV. The first row must be a header.
    pub fn from_reader<R: io::Read>(reader: R, raw_column: &str) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let schema = Schema::from_header(reader.headers()?, raw_column)?;

        let mut items = Vec::new();
        let mut misses = 0;

        for record in reader.records() {
            let (item, missed) = schema.item(&record?);

            misses += missed.len();
            items.push(item);
        }

        if items.is_empty() {
            return Err(DatasetError::Empty.into());
        }

        if misses > 0 {
            log::warn!(
                "{} field values could not be aligned across {} log lines",
                misses,
                items.len()
            );
        }

        log::info!(
            "Loaded {} log lines with fields: {}",
            items.len(),
            schema.fields().join(", ")
        );

        Ok(Self {
            dataset: InMemDataset::new(items),
            schema,
        })
    }

    /// All items, in dataset order
    pub fn items(&self) -> Vec<Item> {
        self.dataset.iter().collect()
    }

    /// Shuffle with a fixed seed and split off `test_ratio` of the items as a test set. Both
    /// sides keep at least one item when there are two or more.
    pub fn split(self, test_ratio: f64, seed: u64) -> (Self, Self) {
        let mut items = self.items();
        items.shuffle(&mut StdRng::seed_from_u64(seed));

        let total = items.len();
        let mut n_test = (total as f64 * test_ratio.clamp(0.0, 1.0)).round() as usize;

        if total >= 2 {
            n_test = n_test.clamp(1, total - 1);
        }

        let train = items.split_off(n_test);

        (
            Self {
                dataset: InMemDataset::new(train),
                schema: self.schema.clone(),
            },
            Self {
                dataset: InMemDataset::new(items),
                schema: self.schema,
            },
        )
    }
}

#[async_trait]
impl LoadableDataset<Item> for Dataset {
    /// Constructs the dataset from `<data_dir>/datasets/apache/logs.csv`
    async fn load(data_dir: &str, raw_column: &str) -> anyhow::Result<Self> {
        let path = format!("{}/datasets/{}/{}", data_dir, DATASET, FILE);

        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow!("Unable to read dataset file {}: {}", path, e))?;

        Self::from_reader(contents.as_slice(), raw_column)
    }

    fn labels(&self) -> Vec<String> {
        self.schema.labels()
    }
}
