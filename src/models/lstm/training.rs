use burn::{
    data::dataloader::batcher::Batcher as _,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer, RmsPropConfig},
    tensor::{backend::AutodiffBackend, Tensor},
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{config::TrainerConfig, error::Error, models::metrics::Score, utils::tensors::to_vec};

use super::{
    batcher::{Batcher, Sequence, Train},
    model::Model,
};

const PROBABILITY_EPSILON: f64 = 1e-7;

/// Output from training
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// Mean batch loss of the last epoch
    pub final_train_loss: f64,

    /// Validation score after the last epoch, if any rows were held out
    pub final_valid: Option<Score>,

    /// Number of epochs completed
    pub epochs_completed: usize,
}

/// Mean binary cross-entropy between probabilities and `{0, 1}` targets
pub fn binary_cross_entropy<B: burn::tensor::backend::Backend>(
    probabilities: Tensor<B, 1>,
    targets: Tensor<B, 1>,
) -> Tensor<B, 1> {
    let probabilities = probabilities.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);

    let positive = targets.clone() * probabilities.clone().log();
    let negative = targets.neg().add_scalar(1.0) * probabilities.neg().add_scalar(1.0).log();

    (positive + negative).mean().neg()
}

/// Train the model with RMSProp and binary cross-entropy.
///
/// The trailing `validation_split` fraction of `sequences` is held out and scored after every
/// epoch. The remaining rows are reshuffled each epoch with a generator seeded from the config.
pub fn train<B: AutodiffBackend>(
    mut model: Model<B>,
    sequences: Vec<Sequence>,
    config: &TrainerConfig,
    device: &B::Device,
) -> Result<(Model<B>, TrainingOutput), Error> {
    if sequences.is_empty() {
        return Err(Error::Training("no training rows".to_string()));
    }

    let split_at = (sequences.len() as f64 * (1.0 - config.validation_split)).floor() as usize;
    let mut train_rows = sequences;
    let valid_rows = train_rows.split_off(split_at.min(train_rows.len()));

    if train_rows.is_empty() {
        return Err(Error::Training(
            "no training rows left after the validation split".to_string(),
        ));
    }

    log::info!(
        "Training on {} rows, validating on {}",
        train_rows.len(),
        valid_rows.len()
    );

    let batcher = Batcher::<B>::new(config.max_len, device.clone());
    let batcher_valid = Batcher::<B::InnerBackend>::new(config.max_len, device.clone());

    let mut optimizer = RmsPropConfig::new().with_alpha(0.9).init();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut output = TrainingOutput {
        final_train_loss: 0.0,
        final_valid: None,
        epochs_completed: 0,
    };

    for epoch in 1..=config.epochs {
        let mut indices: Vec<usize> = (0..train_rows.len()).collect();
        indices.shuffle(&mut rng);

        let mut epoch_loss = 0.0;
        let mut batch_count = 0;

        for batch_indices in indices.chunks(config.batch_size) {
            let items: Vec<Sequence> = batch_indices
                .iter()
                .map(|i| train_rows[*i].clone())
                .collect();

            let batch: Train<B> = batcher.batch(items);

            let probabilities = model.infer(batch.input);
            let loss = binary_cross_entropy(probabilities, batch.targets);

            epoch_loss += to_vec(loss.clone()).first().copied().unwrap_or_default() as f64;
            batch_count += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        output.final_train_loss = epoch_loss / batch_count.max(1) as f64;
        output.epochs_completed = epoch;

        if valid_rows.is_empty() {
            log::info!(
                "Epoch {}/{}: loss {:.4}",
                epoch,
                config.epochs,
                output.final_train_loss
            );

            continue;
        }

        let (tokens, labels): (Vec<_>, Vec<_>) = valid_rows
            .iter()
            .map(|row| (row.tokens.clone(), row.label))
            .unzip();

        let probabilities = model
            .valid()
            .predict(&batcher_valid, tokens, config.batch_size);
        let score = Score::from_probabilities(&probabilities, &labels);

        log::info!(
            "Epoch {}/{}: loss {:.4}, val_loss {:.4}, val_accuracy {:.4}",
            epoch,
            config.epochs,
            output.final_train_loss,
            score.loss,
            score.accuracy
        );

        output.final_valid = Some(score);
    }

    Ok((model, output))
}
