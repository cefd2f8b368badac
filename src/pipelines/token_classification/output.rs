use burn::{
    tensor::{backend::Backend, Int, Tensor},
    train::metric::{AccuracyInput, Adaptor, LossInput},
};
use derive_new::new;

/// Token classification output adapted for multiple metrics.
#[derive(new)]
pub struct Output<B: Backend> {
    /// The loss.
    pub loss: Tensor<B, 1>,

    /// The logits: [batch_size, seq_length, n_labels]
    pub output: Tensor<B, 3>,

    /// The target label ids: [batch_size, seq_length]
    pub targets: Tensor<B, 2, Int>,
}

impl<B: Backend> Adaptor<AccuracyInput<B>> for Output<B> {
    fn adapt(&self) -> AccuracyInput<B> {
        let [batch_size, seq_length, n_labels] = self.output.dims();

        // Flatten so every token position counts as one prediction
        AccuracyInput::new(
            self.output
                .clone()
                .reshape([batch_size * seq_length, n_labels]),
            self.targets.clone().reshape([batch_size * seq_length]),
        )
    }
}

impl<B: Backend> Adaptor<LossInput<B>> for Output<B> {
    fn adapt(&self) -> LossInput<B> {
        LossInput::new(self.loss.clone())
    }
}
