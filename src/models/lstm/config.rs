use burn::{
    nn::{lstm::LstmConfig, EmbeddingConfig, LinearConfig},
    tensor::backend::Backend,
};

use crate::config::TrainerConfig;

use super::model::{Model, SpatialDropout};

/// The Model Configuration, saved next to the weights so serving can rebuild the network
#[derive(burn::config::Config, Debug)]
pub struct ModelConfig {
    /// Number of embedding rows
    pub vocab_size: usize,

    /// Sequence length the model was trained with
    pub max_len: usize,

    /// Embedding width
    #[config(default = 100)]
    pub embedding_size: usize,

    /// LSTM hidden state width
    #[config(default = 100)]
    pub hidden_size: usize,

    /// Fraction of embedding channels dropped while training
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl ModelConfig {
    /// Derive the architecture from the trainer settings
    pub fn from_trainer(config: &TrainerConfig) -> Self {
        ModelConfig::new(config.max_words, config.max_len)
            .with_embedding_size(config.embedding_size)
            .with_hidden_size(config.hidden_size)
            .with_dropout(config.dropout)
    }

    /// Initializes a model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model {
            embedding: EmbeddingConfig::new(self.vocab_size, self.embedding_size).init(device),
            dropout: SpatialDropout::new(self.dropout),
            lstm: LstmConfig::new(self.embedding_size, self.hidden_size, true).init(device),
            output: LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}
