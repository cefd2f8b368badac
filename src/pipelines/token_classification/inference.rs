use std::{collections::BTreeMap, path::Path};

use burn::{
    config::Config as _,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::metrics::get_entities;

use super::{
    alignment::{pre_tokenize, Word},
    evaluation::predict_words,
    Batcher, ModelConfig,
};

/// The number of lines run through the model at once
const BATCH_SIZE: usize = 16;

/// A log line split into fields by the model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// The raw log line
    pub text: String,

    /// Field values keyed by lower-case field name
    pub fields: BTreeMap<String, String>,
}

/// Turn per-word BIO labels back into field values. Each value is the slice of the original line
/// from the first to the last word of its span, so inner whitespace and punctuation survive. When
/// a field is predicted more than once, the first span wins.
pub fn extract_fields<S: AsRef<str>>(
    text: &str,
    words: &[Word],
    labels: &[S],
) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    for entity in get_entities(labels) {
        let (Some(first), Some(last)) = (words.get(entity.start), words.get(entity.end)) else {
            continue;
        };

        fields
            .entry(entity.kind.to_lowercase())
            .or_insert_with(|| text[first.span.start..last.span.end].to_string());
    }

    fields
}

/// Load a trained model from its artifact directory and parse raw log lines with it
pub fn infer<B: Backend, C: ModelConfig>(
    device: B::Device,  // Device on which to perform computation (e.g., CPU or CUDA device)
    artifact_dir: &str, // Directory containing the config, tokenizer and model files
    lines: Vec<String>, // Raw log lines to parse
) -> anyhow::Result<Vec<ParsedLine>> {
    // Load experiment configuration
    let model_config = C::load(format!("{artifact_dir}/config.json").as_str())
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    // Initialize tokenizer
    let tokenizer_file = Path::new(artifact_dir).join("tokenizer.json");
    let tokenizer = Tokenizer::from_file(&tokenizer_file).map_err(|e| {
        anyhow!(
            "Unable to load tokenizer from {}: {}",
            tokenizer_file.display(),
            e
        )
    })?;

    // Initialize batcher for batching samples
    let batcher = Batcher::<B>::new(tokenizer, model_config.get_config(), device.clone())?;

    // Load trained model weights
    log::info!("Loading weights from {}", artifact_dir);

    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

    // Create model using loaded weights
    let model = model_config.init::<B>(&device).load_record(record);

    let mut parsed = Vec::with_capacity(lines.len());

    for chunk in lines.chunks(BATCH_SIZE) {
        let words: Vec<Vec<Word>> = chunk.iter().map(|line| pre_tokenize(line)).collect();

        let encoded = words
            .iter()
            .map(|words| {
                let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
                batcher.encode(&texts)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let n_words: Vec<usize> = words.iter().map(Vec::len).collect();
        let labels = predict_words(&model, &batcher, &encoded, &n_words);

        for ((text, words), labels) in chunk.iter().zip(&words).zip(labels) {
            parsed.push(ParsedLine {
                text: text.clone(),
                fields: extract_fields(text, words, &labels),
            });
        }
    }

    log::debug!("Parsed {} log lines", parsed.len());

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_extract_fields_keeps_original_text() {
        let text = r#"10.0.0.1 - - [01/Jan/2024:00:00:01 +0000] "GET /a b HTTP/1.1" 200 512"#;
        let words = pre_tokenize(text);

        let mut labels = vec!["O"; words.len()];
        // 10 . 0 . 0 . 1
        labels[0] = "B-CLIENT_IP";
        for label in &mut labels[1..7] {
            *label = "I-CLIENT_IP";
        }

        let status = words.iter().position(|w| w.text == "200").unwrap();
        labels[status] = "B-STATUS";

        let fields = extract_fields(text, &words, &labels);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["client_ip"], "10.0.0.1");
        assert_eq!(fields["status"], "200");
    }

    #[test]
    fn test_extract_fields_spans_inner_whitespace() {
        let text = "agent: Mozilla/5.0 (X11; Linux)";
        let words = pre_tokenize(text);

        let mut labels = vec!["I-USER_AGENT"; words.len()];
        labels[0] = "O";
        labels[1] = "O";
        labels[2] = "B-USER_AGENT";

        let fields = extract_fields(text, &words, &labels);

        assert_eq!(fields["user_agent"], "Mozilla/5.0 (X11; Linux)");
    }

    #[test]
    fn test_extract_fields_first_span_wins() {
        let text = "200 404";
        let words = pre_tokenize(text);

        let fields = extract_fields(text, &words, &["B-STATUS", "B-STATUS"]);

        assert_eq!(fields["status"], "200");
    }

    #[test]
    fn test_extract_fields_ignores_labels_past_words() {
        let text = "GET";
        let words = pre_tokenize(text);

        let fields = extract_fields(text, &words, &["O", "B-METHOD"]);

        assert!(fields.is_empty());
    }
}
