use burn::{
    data::dataloader::{self, batcher::Batcher as _},
    tensor::{backend::Backend, Int, Tensor},
};
use derive_new::new;

use crate::{
    text::tokenizer::PAD_ID,
    utils::tensors::{labels_to, pad_to},
};

/// A tokenized row with its binary label
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct Sequence {
    /// Token ids, before padding
    pub tokens: Vec<usize>,

    /// The binary label
    pub label: u8,
}

/// Struct for an inference batch
#[derive(Clone, Debug, new)]
pub struct Infer<B: Backend> {
    /// Padded token ids, `[batch_size, max_len]`
    pub tokens: Tensor<B, 2, Int>,
}

/// Struct for a training batch
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// Labels for the batch, `[batch_size]`
    pub targets: Tensor<B, 1>,
}

/// Struct for batching token sequences
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// Every sequence is padded or truncated to this length
    max_len: usize,

    /// Device on which to perform computation
    device: B::Device,
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<Vec<usize>, Infer<B>> for Batcher<B> {
    fn batch(&self, items: Vec<Vec<usize>>) -> Infer<B> {
        Infer {
            tokens: pad_to::<B>(PAD_ID, &items, self.max_len, &self.device),
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend> dataloader::batcher::Batcher<Sequence, Train<B>> for Batcher<B> {
    fn batch(&self, items: Vec<Sequence>) -> Train<B> {
        let labels: Vec<u8> = items.iter().map(|item| item.label).collect();

        let input: Infer<B> = self.batch(items.into_iter().map(|item| item.tokens).collect());

        Train {
            input,
            targets: labels_to::<B>(&labels, &self.device),
        }
    }
}

#[cfg(test)]
mod tests {
    use burn::data::dataloader::batcher::Batcher as _;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Backend as TestBackend;

    #[test]
    fn batches_tokens_and_targets() {
        let batcher = Batcher::<TestBackend>::new(3, Default::default());

        let batch: Train<TestBackend> = batcher.batch(vec![
            Sequence::new(vec![4, 5], 1),
            Sequence::new(vec![], 0),
        ]);

        assert_eq!(batch.input.tokens.dims(), [2, 3]);
        assert_eq!(batch.targets.into_data().convert::<f32>().value, vec![1.0, 0.0]);
    }
}
