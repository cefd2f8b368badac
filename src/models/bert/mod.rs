/// BERT for Token Classification (such as log field extraction)
pub mod token_classification;
