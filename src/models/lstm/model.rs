use burn::{
    data::dataloader::batcher::Batcher as BatcherTrait,
    module::Module,
    nn::{lstm::Lstm, Embedding, Linear},
    tensor::{activation::sigmoid, backend::Backend, Distribution, Int, Tensor},
};

use crate::utils::tensors::to_vec;

use super::batcher::{Batcher, Infer};

/// Dropout that zeroes whole embedding channels, sharing one mask across every timestep of a
/// sequence. Only active on autodiff backends, like [`burn::nn::Dropout`].
#[derive(Module, Clone, Debug)]
pub struct SpatialDropout {
    prob: f64,
}

impl SpatialDropout {
    /// A dropout dropping each channel with probability `prob`
    pub fn new(prob: f64) -> Self {
        Self { prob }
    }

    /// Applies the dropout to a `[batch_size, seq_length, channels]` tensor
    pub fn forward<B: Backend>(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        if !B::ad_enabled() || self.prob == 0.0 {
            return input;
        }

        let [batch_size, seq_length, channels] = input.dims();
        let keep = 1.0 - self.prob;

        let mask = Tensor::<B, 3>::random(
            [batch_size, 1, channels],
            Distribution::Bernoulli(keep),
            &input.device(),
        )
        .repeat(1, seq_length);

        input * mask / keep
    }
}

/// Embedding, spatial dropout, a single LSTM layer and a sigmoid output unit
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Token embeddings
    pub embedding: Embedding<B>,

    /// Channel dropout over the embedded sequence
    pub dropout: SpatialDropout,

    /// The recurrent layer
    pub lstm: Lstm<B>,

    /// Linear layer producing one logit per sequence
    pub output: Linear<B>,
}

impl<B: Backend> Model<B> {
    /// Defines the forward pass, returning a `[batch_size, 1]` tensor of logits
    pub fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, seq_length] = tokens.dims();

        let embedded = self.dropout.forward(self.embedding.forward(tokens));

        let (_cell_states, hidden_states) = self.lstm.forward(embedded, None);
        let [_, _, hidden_size] = hidden_states.dims();

        let last = hidden_states
            .slice([0..batch_size, seq_length - 1..seq_length, 0..hidden_size])
            .reshape([batch_size, hidden_size]);

        self.output.forward(last)
    }

    /// Probability of the positive class for every sequence, shape `[batch_size]`
    pub fn infer(&self, input: Infer<B>) -> Tensor<B, 1> {
        let [batch_size, _] = input.tokens.dims();

        sigmoid(self.forward(input.tokens)).reshape([batch_size])
    }

    /// Run inference over any number of token sequences in chunks of `batch_size`
    pub fn predict(
        &self,
        batcher: &Batcher<B>,
        sequences: Vec<Vec<usize>>,
        batch_size: usize,
    ) -> Vec<f32> {
        let mut probabilities = Vec::with_capacity(sequences.len());

        for chunk in sequences.chunks(batch_size.max(1)) {
            let input: Infer<B> = batcher.batch(chunk.to_vec());

            probabilities.extend(to_vec(self.infer(input)));
        }

        probabilities
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{models::lstm::ModelConfig, Backend as TestBackend, TrainingBackend};

    #[test]
    fn produces_one_probability_per_sequence() {
        let device = Default::default();
        let model = ModelConfig::new(10, 4)
            .with_embedding_size(3)
            .with_hidden_size(2)
            .init::<TestBackend>(&device);
        let batcher = Batcher::<TestBackend>::new(4, device);

        let probabilities = model.predict(&batcher, vec![vec![2, 3], vec![], vec![4; 9]], 2);

        assert_eq!(probabilities.len(), 3);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn spatial_dropout_is_a_no_op_without_autodiff() {
        let input = Tensor::<TestBackend, 3>::ones([2, 3, 4], &Default::default());

        let output = SpatialDropout::new(0.5).forward(input.clone());

        assert_eq!(output.into_data(), input.into_data());
    }

    #[test]
    fn spatial_dropout_drops_whole_channels() {
        let (batch_size, seq_length, channels) = (4, 5, 8);
        let input = Tensor::<TrainingBackend, 3>::ones(
            [batch_size, seq_length, channels],
            &Default::default(),
        );

        let values = SpatialDropout::new(0.5)
            .forward(input)
            .into_data()
            .convert::<f32>()
            .value;

        for b in 0..batch_size {
            for c in 0..channels {
                let first = values[b * seq_length * channels + c];

                assert!(first == 0.0 || (first - 2.0).abs() < 1e-6);

                for t in 1..seq_length {
                    assert_eq!(values[(b * seq_length + t) * channels + c], first);
                }
            }
        }
    }
}
