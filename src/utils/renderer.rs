use burn::train::renderer::{MetricState, MetricsRenderer, TrainingProgress};
use derive_new::new;

/// A Simple renderer for TUI-disabled modes, reporting progress through the log
#[derive(new)]
pub struct Simple {}

impl Simple {
    fn log_progress(split: &str, item: &TrainingProgress) {
        log::info!(
            "[{}] epoch {}/{} - iteration {} - {}/{} items",
            split,
            item.epoch,
            item.epoch_total,
            item.iteration,
            item.progress.items_processed,
            item.progress.items_total
        );
    }

    fn log_metric(split: &str, state: &MetricState) {
        if let MetricState::Numeric(entry, _) = state {
            log::debug!("[{}] {}: {}", split, entry.name, entry.formatted);
        }
    }
}

impl MetricsRenderer for Simple {
    fn update_train(&mut self, state: MetricState) {
        Self::log_metric("train", &state);
    }

    fn update_valid(&mut self, state: MetricState) {
        Self::log_metric("valid", &state);
    }

    fn render_train(&mut self, item: TrainingProgress) {
        Self::log_progress("train", &item);
    }

    fn render_valid(&mut self, item: TrainingProgress) {
        Self::log_progress("valid", &item);
    }
}
