use std::fmt::Debug;

/// A trait for items that can be used for token classification
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the pre-tokenized words of the item
    fn words(&self) -> Vec<&str>;

    /// Returns one class label per word
    fn class_labels(&self) -> Vec<&str>;
}
