use std::fmt::Display;

use crate::pipelines::Pipeline;

/// BERT Variants
/// -------------

/// The base model type
pub static BERT: &str = "bert";

/// bert-base-uncased
pub static BERT_BASE_UNCASED: &str = "bert-base-uncased";

/// bert-base-cased
pub static BERT_BASE_CASED: &str = "bert-base-cased";

/// All available BERT models
pub static ALL_BERT_MODELS: &[&str; 2] = &[BERT_BASE_CASED, BERT_BASE_UNCASED];

/// The default model for token classification. Log lines are case sensitive (methods, paths,
/// user agents), so the cased vocabulary is preferred.
pub static DEFAULT_TOKEN_CLASSIFICATION_MODEL: &str = BERT_BASE_CASED;

/// Available Models
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Model {
    /// The BERT family of models, with the specific model name contained within
    Bert(String),
}

impl Model {
    /// Get the default model variant for the given pipeline
    pub fn default_for(pipeline: &Pipeline) -> Self {
        match pipeline {
            Pipeline::TokenClassification => {
                Model::Bert(DEFAULT_TOKEN_CLASSIFICATION_MODEL.to_string())
            }
        }
    }

    /// Get the model type
    pub fn model_type(&self) -> &str {
        match self {
            Model::Bert(_) => BERT,
        }
    }

    /// Check if the model is valid for the given pipeline
    pub fn is_supported(&self, pipeline: &Pipeline) -> bool {
        match self {
            Model::Bert(name) => match pipeline {
                Pipeline::TokenClassification => ALL_BERT_MODELS.contains(&name.as_str()),
            },
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Model::Bert(name) = self;

        write!(f, "{}", name)
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if ALL_BERT_MODELS.contains(&value) {
            Ok(Model::Bert(value.to_string()))
        } else {
            Err(ModelError::Unknown(value.to_string()))
        }
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),

    /// The model can't be used with the given pipeline
    #[error("{0} is not supported by the {1} pipeline")]
    Unsupported(String, String),
}
