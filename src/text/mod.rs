/// Training-time normalization and prediction-time cleaning
pub mod cleaning;

/// English stopwords
pub mod stopwords;

/// Word-level tokenizer
pub mod tokenizer;

pub use cleaning::{clean_for_prediction, normalize};
pub use tokenizer::WordTokenizer;
