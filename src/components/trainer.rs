use std::path::Path;

use crate::{
    artifacts::{DataTransformationArtifact, ModelTrainerArtifact},
    config::{Config, Layout, TrainerConfig, TransformationConfig},
    dataset::{train_test_split, write_column, Dataset, Item},
    error::Error,
    models::lstm::{self, Classifier, ModelConfig, Sequence},
    text::WordTokenizer,
    TrainingBackend,
};

/// Splits the dataset, fits the tokenizer and trains the model
pub struct ModelTrainer<'a> {
    config: &'a TrainerConfig,
    columns: &'a TransformationConfig,
    layout: &'a Layout,
}

impl<'a> ModelTrainer<'a> {
    /// Create the stage for one run
    pub fn new(config: &'a Config, layout: &'a Layout) -> Self {
        Self {
            config: &config.trainer,
            columns: &config.transformation,
            layout,
        }
    }

    /// Train on the transformed dataset and persist the model, tokenizer and splits
    pub fn initiate(
        &self,
        transformation: &DataTransformationArtifact,
    ) -> Result<ModelTrainerArtifact, Error> {
        log::info!("Starting model training");

        let items = Dataset::load(
            &transformation.transformed_data_path,
            &self.columns.text_column,
            &self.columns.label_column,
        )?
        .items();

        let (train, test) = train_test_split(items, self.config.test_fraction, self.config.seed);

        log::info!("Split into {} training and {} test rows", train.len(), test.len());

        self.write_split(&train, &self.layout.x_train_path(), &self.layout.y_train_path())?;
        self.write_split(&test, &self.layout.x_test_path(), &self.layout.y_test_path())?;

        let texts: Vec<&str> = train.iter().map(|item| item.tweet.as_str()).collect();
        let tokenizer = WordTokenizer::fit(&texts, self.config.max_words)?;

        log::debug!("Fitted a vocabulary of {} ids", tokenizer.vocab_size());

        let sequences = tokenizer
            .texts_to_sequences(&texts)?
            .into_iter()
            .zip(&train)
            .map(|(tokens, item)| Sequence::new(tokens, item.label))
            .collect();

        let device = Default::default();
        let model_config = ModelConfig::from_trainer(self.config);
        let model = model_config.init::<TrainingBackend>(&device);

        let (model, output) = lstm::train(model, sequences, self.config, &device)?;

        log::info!(
            "Model training finished after {} epochs, final loss {:.4}",
            output.epochs_completed,
            output.final_train_loss
        );

        let artifact = ModelTrainerArtifact::new(
            self.layout.trained_model_path(),
            self.layout.model_config_path(),
            self.layout.tokenizer_path(),
            self.layout.x_test_path(),
            self.layout.y_test_path(),
        );

        Classifier::new(model, model_config, tokenizer, device).save(
            &artifact.trained_model_path,
            &artifact.model_config_path,
            &artifact.tokenizer_path,
        )?;

        Ok(artifact)
    }

    fn write_split(
        &self,
        items: &[Item],
        text_path: &Path,
        label_path: &Path,
    ) -> Result<(), Error> {
        let texts: Vec<&str> = items.iter().map(|item| item.tweet.as_str()).collect();
        let labels: Vec<u8> = items.iter().map(|item| item.label).collect();

        write_column(text_path, &self.columns.text_column, &texts)?;
        write_column(label_path, &self.columns.label_column, &labels)?;

        Ok(())
    }
}
