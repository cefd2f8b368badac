/// Token Classification
pub mod token_classification;

/// Available Pipelines
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Pipeline {
    /// Token Classification
    TokenClassification,
}

impl Pipeline {
    /// Get the unique string token that identifies this pipeline
    pub fn as_str(&self) -> &str {
        match self {
            Pipeline::TokenClassification => token_classification::PIPELINE,
        }
    }
}

impl TryFrom<&str> for Pipeline {
    type Error = PipelineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value == token_classification::PIPELINE {
            Ok(Pipeline::TokenClassification)
        } else {
            Err(PipelineError::Unknown(value.to_string()))
        }
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pipeline Error
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// No pipeline found for the given string
    #[error("no pipeline found for {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pipeline_from_str() {
        let pipeline = Pipeline::try_from("token-classification").unwrap();

        assert_eq!(pipeline, Pipeline::TokenClassification);
        assert_eq!(pipeline.to_string(), "token-classification");
    }

    #[test]
    fn test_unknown_pipeline() {
        let err = Pipeline::try_from("text-classification").unwrap_err();

        assert_eq!(err.to_string(), "no pipeline found for text-classification");
    }
}
