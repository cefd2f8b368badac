use std::collections::BTreeMap;

use burn::LearningRate;

/// The common model configuration properties needed for the pipeline
#[derive(Clone, Debug)]
pub struct Config {
    /// The padding token ID
    pub pad_token_id: usize,

    /// The max position embeddings
    pub max_position_embeddings: usize,

    /// An optional max sequence length, if different from max position embeddings
    pub max_seq_len: Option<usize>,

    /// A mapping from label ids to label names, including the padding label
    pub id2label: BTreeMap<usize, String>,
}

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Training {
    /// Batch size
    #[config(default = 8)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 3)]
    pub num_epochs: usize,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Learning rate, held constant for the whole run
    #[config(default = 5e-5)]
    pub learning_rate: LearningRate,

    /// Dropout rate
    #[config(default = 0.1)]
    pub hidden_dropout_prob: f64,

    /// Maximum number of wordpieces per log line, including special tokens
    #[config(default = 128)]
    pub max_seq_length: usize,

    /// Share of the dataset held out for evaluation
    #[config(default = 0.2)]
    pub test_split: f64,

    /// Seed for the train/test shuffle
    #[config(default = 42)]
    pub seed: u64,

    /// The CSV column holding the raw log line
    #[config(default = "\"raw\".to_string()")]
    pub raw_column: String,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,

    /// Model name (e.g., "bert-base-cased")
    pub model_name: String,

    /// The Dataset to use (e.g., "apache")
    pub dataset_name: String,

    /// Class labels for the selected dataset
    pub labels: Vec<String>,
}

impl Training {
    /// The directory that holds checkpoints and the final artifacts for this run
    pub fn artifact_dir(&self) -> String {
        artifact_dir(&self.data_dir, &self.dataset_name, &self.model_name)
    }
}

/// The artifact directory for a dataset and model under the given data directory
pub fn artifact_dir(data_dir: &str, dataset_name: &str, model_name: &str) -> String {
    format!(
        "{}/token-classification/{}/{}",
        data_dir, dataset_name, model_name
    )
}
