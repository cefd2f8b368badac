//! Adapt Bert for Token Classification to the Token Classification pipeline

use std::{collections::BTreeMap, path::PathBuf};

use bert_burn::model::BertModelConfig;
use burn::{
    config::Config as _,
    module::Module,
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};

use crate::pipelines::token_classification::{self, labels::LabelMap, TokenClassifier};

use super::Model;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    // -- Fields copied from BertModelConfig because #[serde(flatten)] is not supported yet
    /// Number of attention heads in the multi-head attention
    pub num_attention_heads: usize,
    /// Number of transformer encoder layers/blocks
    pub num_hidden_layers: usize,
    /// Layer normalization epsilon
    pub layer_norm_eps: f64,
    /// Size of bert embedding (e.g., 768 for bert-base)
    pub hidden_size: usize,
    /// Size of the intermediate position wise feedforward layer
    pub intermediate_size: usize,
    /// Size of the vocabulary
    pub vocab_size: usize,
    /// Max position embeddings, 512 for BERT
    pub max_position_embeddings: usize,
    /// Identifier for sentence type in input (e.g., 0 for single sentence, 1 for pair)
    pub type_vocab_size: usize,
    /// Dropout value across layers, typically 0.1
    pub hidden_dropout_prob: f64,
    /// BERT model name (bert)
    pub model_type: String,
    /// Index of the padding token
    pub pad_token_id: usize,
    /// Maximum sequence length for the tokenizer
    pub max_seq_len: Option<usize>,
    /// Whether to add a pooling layer to the model
    pub with_pooling_layer: Option<bool>,
    // -- End fields copied from BertModelConfig
    /// A map from label ids to label names, including the padding label at id 0
    pub id2label: BTreeMap<usize, String>,
}

impl Config {
    /// Combine a pretrained BERT config with the labels of a dataset
    pub fn new_with_labels(model: BertModelConfig, labels: &[String]) -> Self {
        let id2label = LabelMap::new(labels).id2label;

        Config::new(
            model.num_attention_heads,
            model.num_hidden_layers,
            model.layer_norm_eps,
            model.hidden_size,
            model.intermediate_size,
            model.vocab_size,
            model.max_position_embeddings,
            model.type_vocab_size,
            model.hidden_dropout_prob,
            model.model_type,
            model.pad_token_id,
            id2label,
        )
        .with_max_seq_len(model.max_seq_len)
        .with_with_pooling_layer(model.with_pooling_layer)
    }

    /// Get the Bert model configuration
    pub fn get_bert_config(&self) -> BertModelConfig {
        BertModelConfig::new(
            self.num_attention_heads,
            self.num_hidden_layers,
            self.layer_norm_eps,
            self.hidden_size,
            self.intermediate_size,
            self.vocab_size,
            self.max_position_embeddings,
            self.type_vocab_size,
            self.hidden_dropout_prob,
            self.model_type.clone(),
            self.pad_token_id,
        )
        .with_max_seq_len(self.max_seq_len)
        .with_with_pooling_layer(self.with_pooling_layer)
    }

    /// Initializes a model with a fresh classification head
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let model = self.get_bert_config().init(device);

        let n_classes = self.id2label.len();

        let dropout = DropoutConfig::new(self.hidden_dropout_prob).init();
        let output = LinearConfig::new(self.hidden_size, n_classes).init(device);

        Model {
            model,
            dropout,
            output,
            n_classes,
        }
    }
}

impl token_classification::ModelConfig for Config {
    /// Initialize the model
    fn init<B: Backend>(&self, device: &B::Device) -> impl TokenClassifier<B> + Module<B> {
        Config::init::<B>(self, device)
    }

    /// Load a pretrained model configuration
    fn load_pretrained(
        config_file: PathBuf,
        labels: &[String],
        hidden_dropout_prob: f64,
        max_seq_length: usize,
    ) -> anyhow::Result<Self> {
        let mut bert_config = BertModelConfig::load(config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        // Token classification reads the hidden states directly
        bert_config.with_pooling_layer = Some(false);
        bert_config.hidden_dropout_prob = hidden_dropout_prob;
        bert_config.max_seq_len = Some(max_seq_length);

        let model_config = Config::new_with_labels(bert_config, labels);

        // Padding alone isn't a label set
        if model_config.id2label.len() < 2 {
            return Err(anyhow::anyhow!(
                "Classes are not defined in the model configuration"
            ));
        }

        Ok(model_config)
    }

    fn get_config(&self) -> token_classification::Config {
        token_classification::Config {
            pad_token_id: self.pad_token_id,
            max_position_embeddings: self.max_position_embeddings,
            max_seq_len: self.max_seq_len,
            id2label: self.id2label.clone(),
        }
    }
}
