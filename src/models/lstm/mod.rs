/// Batching of token sequences
pub mod batcher;

/// The model configuration
pub mod config;

/// Loading, saving and running a trained model
pub mod inference;

/// Embedding + LSTM binary classifier
pub mod model;

/// The training loop
pub mod training;

pub use batcher::{Batcher, Sequence};
pub use config::ModelConfig;
pub use inference::Classifier;
pub use model::{Model, ModelRecord};
pub use training::{train, TrainingOutput};
