use std::{fmt::Display, path::PathBuf};

use burn::{
    module::{AutodiffModule, Module},
    tensor::{
        backend::{AutodiffBackend, Backend},
        Tensor,
    },
    train::TrainStep,
};

use super::{
    batcher::{Infer, Train},
    Config, Output,
};

/// A trait for models that can be fine-tuned for Token Classification
pub trait Model<B>: AutodiffModule<B> + TrainStep<Train<B>, Output<B>> + Display
where
    B: AutodiffBackend,
{
    /// The model configuration
    type Config: ModelConfig;

    /// Load a model from a file
    fn load_from_safetensors(
        device: &B::Device,
        model_file: PathBuf,
        config: Self::Config,
    ) -> anyhow::Result<Self>;
}

/// A trait for models that can label tokens, on any backend
pub trait TokenClassifier<B: Backend> {
    /// Defines forward pass for inference, returning label probabilities per token:
    /// [batch_size, seq_length, n_labels]
    fn infer(&self, input: Infer<B>) -> Tensor<B, 3>;
}

/// A trait for configs that can be used for Token Classification models
pub trait ModelConfig: burn::config::Config + Clone {
    /// Initialize the model for inference
    fn init<B: Backend>(&self, device: &B::Device) -> impl TokenClassifier<B> + Module<B>;

    /// Load a pretrained model configuration
    fn load_pretrained(
        config_file: PathBuf,
        labels: &[String],
        hidden_dropout_prob: f64,
        max_seq_length: usize,
    ) -> anyhow::Result<Self>;

    /// Return the Config needed for the token classification pipeline
    fn get_config(&self) -> Config;
}
