use burn::{
    data::dataloader,
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;
use tokenizers::{Tokenizer, TruncationParams};

use crate::utils::tensors;

use super::{
    labels::{LabelMap, PAD_ID},
    Config, Item,
};

/// An inference batch for token classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Tokenized text as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokenized text containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// A training batch for token classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Bert Model input
    pub input: Infer<B>,

    /// Label ids for every token position: [batch_size, max_seq_length]
    pub targets: Tensor<B, 2, Int>,
}

/// A pre-tokenized line after wordpiece tokenization
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Encoded {
    /// Wordpiece ids, including special tokens
    pub token_ids: Vec<usize>,

    /// The index of the word each wordpiece came from, `None` for special tokens
    pub word_ids: Vec<Option<usize>>,
}

impl Encoded {
    /// Whether the token at `index` is the first wordpiece of its word
    fn starts_word(&self, index: usize) -> bool {
        match self.word_ids[index] {
            Some(word) => index == 0 || self.word_ids[index - 1] != Some(word),
            None => false,
        }
    }

    /// Spread word label ids over tokens. The first wordpiece of a word carries its label, every
    /// other position carries the padding label.
    pub fn targets(&self, word_labels: &[usize]) -> Vec<usize> {
        (0..self.word_ids.len())
            .map(|index| match self.word_ids[index] {
                Some(word) if self.starts_word(index) => {
                    word_labels.get(word).copied().unwrap_or(PAD_ID)
                }
                _ => PAD_ID,
            })
            .collect()
    }

    /// Collect per-word predictions from per-token predictions, reading each word from its first
    /// wordpiece. Words that were truncated away come back as `None`.
    pub fn word_predictions(&self, token_predictions: &[usize], n_words: usize) -> Vec<Option<usize>> {
        let mut words = vec![None; n_words];

        for (index, prediction) in token_predictions.iter().enumerate() {
            if index >= self.word_ids.len() || !self.starts_word(index) {
                continue;
            }

            if let Some(word) = self.word_ids[index].filter(|w| *w < n_words) {
                words[word] = Some(*prediction);
            }
        }

        words
    }
}

/// Struct for batching token classification items
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Tokenizer for converting words to wordpiece IDs
    pub tokenizer: Tokenizer,

    /// Maximum sequence length for tokenized text
    pub max_seq_length: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// Label names and ids
    pub labels: LabelMap,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher, truncating every encoding to the configured sequence length
    pub fn new(mut tokenizer: Tokenizer, config: Config, device: B::Device) -> anyhow::Result<Self> {
        let max_seq_length = config
            .max_seq_len
            .unwrap_or(config.max_position_embeddings)
            .min(config.max_position_embeddings);

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_seq_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Unable to configure tokenizer truncation: {}", e))?
            .with_padding(None);

        Ok(Self {
            tokenizer,
            max_seq_length,
            pad_token_id: config.pad_token_id,
            labels: LabelMap::from_id2label(config.id2label),
            device,
        })
    }

    /// Tokenize pre-tokenized words into wordpieces
    pub fn encode<S: AsRef<str>>(&self, words: &[S]) -> anyhow::Result<Encoded> {
        let words: Vec<&str> = words.iter().map(|w| w.as_ref()).collect();

        let encoding = self
            .tokenizer
            .encode(words, true)
            .map_err(|e| anyhow!("Unable to encode words: {}", e))?;

        Ok(Encoded {
            token_ids: encoding.get_ids().iter().map(|t| *t as usize).collect(),
            word_ids: encoding
                .get_word_ids()
                .iter()
                .map(|w| w.map(|w| w as usize))
                .collect(),
        })
    }

    /// Check that every item encodes, so batching can't fail once training has started
    pub fn validate<I: Item>(&self, items: impl IntoIterator<Item = I>) -> anyhow::Result<()> {
        for (index, item) in items.into_iter().enumerate() {
            self.encode(&item.words())
                .map_err(|e| anyhow!("Item {} can't be tokenized: {}", index, e))?;
        }

        Ok(())
    }

    /// Pad encodings into an inference batch
    pub fn infer_batch(&self, encoded: &[Encoded]) -> Infer<B> {
        let token_ids_list = encoded.iter().map(|e| e.token_ids.clone()).collect();

        let padding = generate_padding_mask(
            self.pad_token_id,
            token_ids_list,
            Some(self.max_seq_length),
            &self.device,
        );

        Infer {
            tokens: padding.tensor,
            mask_pad: padding.mask,
        }
    }

    /// Pad encodings and their word labels into a training batch
    pub fn train_batch(&self, encoded: &[Encoded], word_labels: &[Vec<usize>]) -> Train<B> {
        let input = self.infer_batch(encoded);
        let seq_length = input.tokens.dims()[1];

        let targets_list = encoded
            .iter()
            .zip(word_labels)
            .map(|(encoding, labels)| encoding.targets(labels))
            .collect();

        // Pad the labels to match the tokenized sequence length
        let targets = tensors::pad_to::<B>(PAD_ID, targets_list, seq_length, &self.device);

        Train { input, targets }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend, I: Item> dataloader::batcher::Batcher<I, Train<B>> for Batcher<B> {
    /// Collects a vector of token classification items into a training batch
    fn batch(&self, items: Vec<I>) -> Train<B> {
        let mut encoded = Vec::with_capacity(items.len());
        let mut word_labels: Vec<Vec<usize>> = Vec::with_capacity(items.len());

        for item in items {
            // Items are checked with `validate` before the data loaders are built
            encoded.push(self.encode(&item.words()).expect("unable to encode"));

            word_labels.push(
                item.class_labels()
                    .into_iter()
                    .map(|label| self.labels.id(label))
                    .collect(),
            );
        }

        self.train_batch(&encoded, &word_labels)
    }
}

/// A tiny in-memory wordpiece tokenizer and item type for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::{BTreeMap, HashMap};

    use tokenizers::{
        models::wordpiece::WordPiece, pre_tokenizers::bert::BertPreTokenizer,
        processors::bert::BertProcessing, Tokenizer,
    };

    use crate::pipelines::token_classification::{
        labels::{bio_labels, LabelMap},
        Config, Item,
    };

    /// `index` splits into `in ##dex`
    pub const VOCAB: &[&str] = &[
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "GET", "/", "in", "##dex", ".", "html", "200",
    ];

    pub fn tokenizer_with(unk_token: &str) -> Tokenizer {
        let vocab: HashMap<String, u32> = VOCAB
            .iter()
            .enumerate()
            .filter(|(_, token)| **token != "[UNK]" || unk_token == "[UNK]")
            .map(|(id, token)| (token.to_string(), id as u32))
            .collect();

        let model = WordPiece::builder()
            .vocab(vocab)
            .unk_token(unk_token.to_string())
            .build()
            .unwrap();

        let mut tokenizer = Tokenizer::new(model);
        tokenizer
            .with_pre_tokenizer(BertPreTokenizer)
            .with_post_processor(BertProcessing::new(
                ("[SEP]".to_string(), 3),
                ("[CLS]".to_string(), 2),
            ));

        tokenizer
    }

    pub fn tokenizer() -> Tokenizer {
        tokenizer_with("[UNK]")
    }

    /// [PAD] 0, O 1, B-METHOD 2, I-METHOD 3, B-PATH 4, I-PATH 5, B-STATUS 6, I-STATUS 7
    pub fn id2label() -> BTreeMap<usize, String> {
        LabelMap::new(&bio_labels(&["method", "path", "status"])).id2label
    }

    pub fn config(max_seq_len: Option<usize>) -> Config {
        Config {
            pad_token_id: 0,
            max_position_embeddings: 16,
            max_seq_len,
            id2label: id2label(),
        }
    }

    #[derive(Clone, Debug)]
    pub struct Line {
        pub words: Vec<String>,
        pub labels: Vec<String>,
    }

    impl Line {
        pub fn new(words: &[&str], labels: &[&str]) -> Self {
            Self {
                words: words.iter().map(|w| w.to_string()).collect(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            }
        }

        /// `GET /index.html 200`
        pub fn request() -> Self {
            Self::new(
                &["GET", "/", "index", ".", "html", "200"],
                &["B-METHOD", "B-PATH", "I-PATH", "I-PATH", "I-PATH", "B-STATUS"],
            )
        }
    }

    impl Item for Line {
        fn words(&self) -> Vec<&str> {
            self.words.iter().map(String::as_str).collect()
        }

        fn class_labels(&self) -> Vec<&str> {
            self.labels.iter().map(String::as_str).collect()
        }
    }
}
