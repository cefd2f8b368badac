use burn::tensor::backend::Backend;

use crate::metrics::Report;

use super::{
    batcher::{Batcher, Encoded},
    labels::OUTSIDE,
    Item, TokenClassifier,
};

/// Predict the most likely label id for every token position of each encoding
pub fn predict<B, M>(model: &M, batcher: &Batcher<B>, encoded: &[Encoded]) -> Vec<Vec<usize>>
where
    B: Backend,
    M: TokenClassifier<B>,
{
    if encoded.is_empty() {
        return Vec::new();
    }

    let probabilities = model.infer(batcher.infer_batch(encoded));
    let [batch_size, seq_length, _] = probabilities.dims();

    let ids = probabilities.argmax(2).into_data().convert::<i64>().value;

    ids.chunks(seq_length)
        .take(batch_size)
        .map(|row| row.iter().map(|id| *id as usize).collect())
        .collect()
}

/// Predict word-level labels for a batch of encodings, reading words lost to truncation as `O`
pub fn predict_words<B, M>(
    model: &M,
    batcher: &Batcher<B>,
    encoded: &[Encoded],
    n_words: &[usize],
) -> Vec<Vec<String>>
where
    B: Backend,
    M: TokenClassifier<B>,
{
    predict(model, batcher, encoded)
        .into_iter()
        .zip(encoded.iter().zip(n_words))
        .map(|(predictions, (encoding, n_words))| {
            encoding
                .word_predictions(&predictions, *n_words)
                .into_iter()
                .map(|id| id.map_or(OUTSIDE, |id| batcher.labels.label(id)).to_string())
                .collect()
        })
        .collect()
}

/// Score a model on labeled items with entity-level sequence labeling metrics
pub fn evaluate<B, M, I>(
    model: &M,
    batcher: &Batcher<B>,
    items: &[I],
    batch_size: usize,
) -> anyhow::Result<Report>
where
    B: Backend,
    M: TokenClassifier<B>,
    I: Item,
{
    let mut y_true = Vec::with_capacity(items.len());
    let mut y_pred = Vec::with_capacity(items.len());

    for chunk in items.chunks(batch_size.max(1)) {
        let encoded = chunk
            .iter()
            .map(|item| batcher.encode(&item.words()))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let n_words: Vec<usize> = chunk.iter().map(|item| item.words().len()).collect();

        y_pred.extend(predict_words(model, batcher, &encoded, &n_words));
        y_true.extend(chunk.iter().map(|item| {
            item.class_labels()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        }));
    }

    log::info!("Evaluated {} log lines", y_true.len());

    Report::new(&y_true, &y_pred)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use burn::{
        backend::NdArray,
        tensor::{Data, Shape, Tensor},
    };
    use pretty_assertions::assert_eq;

    use crate::pipelines::token_classification::batcher::{
        fixtures::{config, tokenizer, Line},
        Infer,
    };

    use super::*;

    type TestBackend = NdArray<f32>;

    const N_LABELS: usize = 8;

    /// Labels each wordpiece id from a fixed table, `O` for anything else
    struct Lookup(HashMap<usize, usize>);

    impl Lookup {
        /// Tags `GET /index.html 200` correctly, with a stray label on `##dex`
        fn request() -> Self {
            Self(HashMap::from([
                (4, 2),
                (5, 4),
                (6, 5),
                (7, 6),
                (8, 5),
                (9, 5),
                (10, 6),
            ]))
        }
    }

    impl<B: Backend> TokenClassifier<B> for Lookup {
        fn infer(&self, input: Infer<B>) -> Tensor<B, 3> {
            let [batch_size, seq_length] = input.tokens.dims();
            let device = input.tokens.device();
            let tokens = input.tokens.into_data().convert::<i64>().value;

            let mut probabilities = vec![0.0_f32; batch_size * seq_length * N_LABELS];
            for (position, token) in tokens.iter().enumerate() {
                let label = self.0.get(&(*token as usize)).copied().unwrap_or(1);
                probabilities[position * N_LABELS + label] = 1.0;
            }

            Tensor::from_data(
                Data::new(probabilities, Shape::new([batch_size, seq_length, N_LABELS]))
                    .convert::<B::FloatElem>(),
                &device,
            )
        }
    }

    fn batcher(max_seq_len: Option<usize>) -> Batcher<TestBackend> {
        Batcher::new(tokenizer(), config(max_seq_len), Default::default()).unwrap()
    }

    #[test]
    fn test_predict_returns_a_row_per_encoding() {
        let batcher = batcher(None);
        let encoded = vec![
            batcher.encode(&["GET", "200"]).unwrap(),
            batcher.encode(&Line::request().words()).unwrap(),
        ];

        let predictions = predict(&Lookup::request(), &batcher, &encoded);

        assert_eq!(
            predictions,
            vec![
                vec![1, 2, 6, 1, 1, 1, 1, 1, 1],
                vec![1, 2, 4, 5, 6, 5, 5, 6, 1],
            ]
        );
    }

    #[test]
    fn test_predict_empty() {
        assert!(predict(&Lookup::request(), &batcher(None), &[]).is_empty());
    }

    #[test]
    fn test_predict_words_reads_first_wordpiece() {
        let batcher = batcher(None);
        let encoded = vec![batcher.encode(&Line::request().words()).unwrap()];

        let labels = predict_words(&Lookup::request(), &batcher, &encoded, &[6]);

        assert_eq!(
            labels,
            vec![vec!["B-METHOD", "B-PATH", "I-PATH", "I-PATH", "I-PATH", "B-STATUS"]]
        );
    }

    #[test]
    fn test_predict_words_truncated_words_are_outside() {
        let batcher = batcher(Some(5));
        let encoded = vec![batcher.encode(&Line::request().words()).unwrap()];

        let labels = predict_words(&Lookup::request(), &batcher, &encoded, &[6]);

        assert_eq!(labels, vec![vec!["B-METHOD", "B-PATH", "I-PATH", "O", "O", "O"]]);
    }

    #[test]
    fn test_evaluate_scores_every_word() {
        let items = vec![Line::request(), Line::new(&["GET", "200"], &["B-METHOD", "O"])];

        let report = evaluate(&Lookup::request(), &batcher(None), &items, 1).unwrap();

        // 7 of 8 words, with the status of the short line predicted where there is none
        assert!((report.accuracy - 7.0 / 8.0).abs() < 1e-6);
        assert_eq!(report.classes["METHOD"].support, 2);
        assert!((report.classes["METHOD"].f1 - 1.0).abs() < 1e-6);
        assert!((report.classes["STATUS"].precision - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_truncated_lines() {
        let report = evaluate(&Lookup::request(), &batcher(Some(5)), &[Line::request()], 8).unwrap();

        // Only GET, / and the first piece of index survive truncation
        assert!((report.accuracy - 3.0 / 6.0).abs() < 1e-6);
        assert!((report.classes["METHOD"].recall - 1.0).abs() < 1e-6);
        assert!(report.classes["PATH"].recall.abs() < 1e-6);
        assert!(report.classes["STATUS"].recall.abs() < 1e-6);
    }
}
