use std::path::PathBuf;

use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Dropout, Linear},
    tensor::{
        activation::softmax,
        backend::{AutodiffBackend, Backend},
        Int, Tensor,
    },
};

use crate::pipelines::token_classification::{
    self, batcher::Infer, labels::PAD_ID, Output, TokenClassifier,
};

use super::Config;

/// BERT for Token Classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// The base BERT model
    pub model: BertModel<B>,

    /// Dropout applied to the hidden states before classification
    pub dropout: Dropout,

    /// Linear layer for token classification
    pub output: Linear<B>,

    /// Total number of labels, including padding
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Label logits for every token position: [batch_size, seq_length, n_classes]
    pub fn logits(&self, input: BertInferenceBatch<B>) -> Tensor<B, 3> {
        let BertModelOutput { hidden_states, .. } = self.model.forward(input);

        self.output.forward(self.dropout.forward(hidden_states))
    }

    /// Defines forward pass for training
    pub fn forward(&self, input: BertInferenceBatch<B>, targets: Tensor<B, 2, Int>) -> Output<B> {
        let [batch_size, seq_length] = input.tokens.dims();

        let output = self.logits(input);
        let targets = targets.to_device(&output.device());

        // Special tokens and continuation wordpieces carry the padding label
        let loss = CrossEntropyLossConfig::new()
            .with_pad_tokens(Some(vec![PAD_ID]))
            .init(&output.device())
            .forward(
                output
                    .clone()
                    .reshape([batch_size * seq_length, self.n_classes]),
                targets.clone().reshape([batch_size * seq_length]),
            );

        Output {
            loss,
            output,
            targets,
        }
    }

    /// Defines forward pass for inference
    pub fn infer(&self, input: BertInferenceBatch<B>) -> Tensor<B, 3> {
        softmax(self.logits(input), 2)
    }
}

impl<B: Backend> TokenClassifier<B> for Model<B> {
    fn infer(&self, input: Infer<B>) -> Tensor<B, 3> {
        self.infer(BertInferenceBatch {
            tokens: input.tokens,
            mask_pad: input.mask_pad,
        })
    }
}

impl<B: AutodiffBackend> token_classification::Model<B> for Model<B> {
    /// The model configuration
    type Config = Config;

    /// Load pretrained encoder weights, leaving the classification head freshly initialized
    fn load_from_safetensors(
        device: &B::Device,
        model_file: PathBuf,
        config: Self::Config,
    ) -> anyhow::Result<Self> {
        if config.id2label.len() < 2 {
            return Err(anyhow::anyhow!(
                "Classes are not defined in the model configuration"
            ));
        }

        let mut model = config.init::<B>(device);

        let record = BertModel::from_safetensors(model_file, device, config.get_bert_config());
        model.model = model.model.load_record(record);

        log::debug!("Initialized a {} label classification head", model.n_classes);

        Ok(model)
    }
}
