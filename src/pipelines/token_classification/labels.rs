use std::collections::BTreeMap;

/// The label for words outside of any field
pub static OUTSIDE: &str = "O";

/// The label for positions that carry no word label: special tokens, continuation wordpieces and
/// padding. Excluded from the loss and from the metrics.
pub static PAD: &str = "[PAD]";

/// The id reserved for the [`PAD`] label
pub const PAD_ID: usize = 0;

/// The label of the first word of a field
pub fn begin(field: &str) -> String {
    format!("B-{}", field.to_uppercase())
}

/// The label of every word in a field after the first
pub fn inside(field: &str) -> String {
    format!("I-{}", field.to_uppercase())
}

/// The BIO label set for the given fields, in field order, starting with [`OUTSIDE`]
pub fn bio_labels<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let mut labels = vec![OUTSIDE.to_string()];

    for field in fields {
        labels.push(begin(field.as_ref()));
        labels.push(inside(field.as_ref()));
    }

    labels
}

/// Bidirectional mapping between label ids and label names, with [`PAD`] pinned to [`PAD_ID`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    /// A mapping from label ids to label names
    pub id2label: BTreeMap<usize, String>,

    /// A mapping from label names to label ids
    pub label2id: BTreeMap<String, usize>,
}

impl LabelMap {
    /// Build a map from dataset labels. [`PAD`] is inserted at id 0 and duplicates are dropped.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut names = vec![PAD.to_string()];

        for label in labels {
            let label = label.as_ref().trim();

            if !names.iter().any(|name| name == label) {
                names.push(label.to_string());
            }
        }

        Self::from_id2label(names.into_iter().enumerate().collect())
    }

    /// Build a map from an existing id-to-label mapping, such as one restored from a saved config
    pub fn from_id2label(id2label: BTreeMap<usize, String>) -> Self {
        let label2id = id2label
            .iter()
            .map(|(id, label)| (label.clone(), *id))
            .collect();

        Self { id2label, label2id }
    }

    /// The total number of labels, including [`PAD`]
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    /// Whether the map has no labels at all
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }

    /// The id of a label. Unknown labels map to [`OUTSIDE`].
    pub fn id(&self, label: &str) -> usize {
        self.label2id
            .get(label)
            .or_else(|| self.label2id.get(OUTSIDE))
            .copied()
            .unwrap_or(PAD_ID)
    }

    /// The name of a label id. [`PAD`] and unknown ids read as [`OUTSIDE`], since neither can
    /// start or continue a field.
    pub fn label(&self, id: usize) -> &str {
        match self.id2label.get(&id) {
            Some(label) if id != PAD_ID => label,
            _ => OUTSIDE,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bio_labels() {
        assert_eq!(
            bio_labels(&["client_ip", "status"]),
            vec!["O", "B-CLIENT_IP", "I-CLIENT_IP", "B-STATUS", "I-STATUS"]
        );
    }

    #[test]
    fn test_label_map_pins_pad() {
        let labels = LabelMap::new(&bio_labels(&["status"]));

        assert_eq!(labels.len(), 4);
        assert_eq!(labels.id(PAD), PAD_ID);
        assert_eq!(labels.id("O"), 1);
        assert_eq!(labels.id("B-STATUS"), 2);
        assert_eq!(labels.id("I-STATUS"), 3);
    }

    #[test]
    fn test_label_map_drops_duplicates() {
        let labels = LabelMap::new(&["O", "[PAD]", "B-X", " B-X "]);

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.label(2), "B-X");
    }

    #[test]
    fn test_label_map_unknowns_read_as_outside() {
        let labels = LabelMap::new(&bio_labels(&["status"]));

        assert_eq!(labels.id("B-MISSING"), 1);
        assert_eq!(labels.label(PAD_ID), "O");
        assert_eq!(labels.label(99), "O");
    }

    #[test]
    fn test_label_map_restores_from_ids() {
        let labels = LabelMap::new(&bio_labels(&["size"]));
        let restored = LabelMap::from_id2label(labels.id2label.clone());

        assert_eq!(restored, labels);
    }
}
