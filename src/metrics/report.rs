use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
};

use rusev::{classification_report, Average, DivByZeroStrat};
use serde::{Deserialize, Serialize};

use super::entity::get_entities;

/// Precision, recall, F1 and support for one entity type or one average
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Correct predicted entities over all predicted entities
    pub precision: f64,

    /// Correct predicted entities over all true entities
    pub recall: f64,

    /// Harmonic mean of precision and recall
    pub f1: f64,

    /// The number of true entities
    pub support: usize,
}

impl From<&rusev::ClassMetrics> for ClassMetrics {
    fn from(metrics: &rusev::ClassMetrics) -> Self {
        Self {
            precision: metrics.precision as f64,
            recall: metrics.recall as f64,
            f1: metrics.fscore as f64,
            support: metrics.support,
        }
    }
}

/// Entity-level scores for a set of labeled sequences
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Scores per entity type, sorted by type
    pub classes: BTreeMap<String, ClassMetrics>,

    /// Scores over all entities pooled together
    pub micro: ClassMetrics,

    /// Unweighted mean of the per-type scores
    pub macro_avg: ClassMetrics,

    /// Per-type scores weighted by support
    pub weighted: ClassMetrics,

    /// Token-level accuracy
    pub accuracy: f64,
}

impl Report {
    /// Score predicted tag sequences against the true ones with lenient IOB2 chunking. Each pair
    /// of sequences must be the same length.
    pub fn new<S: AsRef<str>, P: AsRef<str>>(
        y_true: &[Vec<S>],
        y_pred: &[Vec<P>],
    ) -> anyhow::Result<Self> {
        let accuracy = accuracy_score(y_true, y_pred);

        // Without true entities every score is 0, and the averages have nothing to divide by
        if !y_true.iter().any(|tags| !get_entities(tags).is_empty()) {
            let classes = y_pred
                .iter()
                .flat_map(|tags| get_entities(tags))
                .map(|entity| (entity.kind, ClassMetrics::default()))
                .collect();

            return Ok(Self {
                classes,
                accuracy,
                ..Self::default()
            });
        }

        let reporter = classification_report(
            as_str_sequences(y_true),
            as_str_sequences(y_pred),
            None,
            DivByZeroStrat::ReplaceBy0,
            None,
            false,
            false,
        )
        .map_err(|e| anyhow!("Unable to score predictions: {}", e))?;

        let mut report = Self {
            accuracy,
            ..Self::default()
        };

        for metrics in HashSet::<rusev::ClassMetrics>::from(reporter).iter() {
            match metrics.average {
                Average::None => {
                    report
                        .classes
                        .insert(metrics.class.clone(), ClassMetrics::from(metrics));
                }
                Average::Micro => report.micro = ClassMetrics::from(metrics),
                Average::Macro => report.macro_avg = ClassMetrics::from(metrics),
                Average::Weighted => report.weighted = ClassMetrics::from(metrics),
                Average::Samples => {}
            }
        }

        Ok(report)
    }
}

fn as_str_sequences<S: AsRef<str>>(sequences: &[Vec<S>]) -> Vec<Vec<&str>> {
    sequences
        .iter()
        .map(|tags| tags.iter().map(AsRef::as_ref).collect())
        .collect()
}

/// The fraction of tokens whose predicted tag equals the true tag, 0 when there are no tokens
pub fn accuracy_score<S: AsRef<str>, P: AsRef<str>>(y_true: &[Vec<S>], y_pred: &[Vec<P>]) -> f64 {
    let mut total = 0;
    let mut correct = 0;

    for (truth, pred) in y_true.iter().zip(y_pred) {
        for (t, p) in truth.iter().zip(pred) {
            total += 1;

            if t.as_ref() == p.as_ref() {
                correct += 1;
            }
        }
    }

    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

impl Display for Report {
    /// Render a plain-text classification report, one row per entity type and one per average
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last = "weighted avg";
        let width = self
            .classes
            .keys()
            .map(String::len)
            .chain(std::iter::once(last.len()))
            .max()
            .unwrap_or(last.len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        let row = |f: &mut std::fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )
        };

        for (kind, metrics) in &self.classes {
            row(f, kind, metrics)?;
        }

        writeln!(f)?;
        row(f, "micro avg", &self.micro)?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, last, &self.weighted)?;

        writeln!(f)?;
        write!(f, "{:>width$} {:>9.4}", "accuracy", self.accuracy)
    }
}
