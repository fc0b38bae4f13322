/// Embedding + LSTM sequence classifier
pub mod lstm;

/// Binary classification metrics
pub mod metrics;
