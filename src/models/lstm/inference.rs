use std::path::{Path, PathBuf};

use burn::{
    config::Config as _,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};

use crate::{
    config::{MODEL_CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE},
    error::Error,
    models::metrics::Score,
    text::WordTokenizer,
};

use super::{batcher::Batcher, config::ModelConfig, model::Model};

const INFERENCE_BATCH_SIZE: usize = 256;

/// The recorder appends its own extension, so it is handed the path without one
fn record_path(model_file: &Path) -> PathBuf {
    let name = model_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = name.strip_suffix(".mpk").unwrap_or(&name);

    model_file.with_file_name(stem)
}

/// A trained model bundled with its configuration and tokenizer
pub struct Classifier<B: Backend> {
    model: Model<B>,
    config: ModelConfig,
    tokenizer: WordTokenizer,
    device: B::Device,
}

impl<B: Backend> Classifier<B> {
    /// Bundle a freshly trained model
    pub fn new(model: Model<B>, config: ModelConfig, tokenizer: WordTokenizer, device: B::Device) -> Self {
        Self {
            model,
            config,
            tokenizer,
            device,
        }
    }

    /// Load the weights, configuration and tokenizer from explicit paths
    pub fn load(
        model_path: &Path,
        config_path: &Path,
        tokenizer_path: &Path,
        device: &B::Device,
    ) -> Result<Self, Error> {
        for path in [model_path, config_path] {
            if !path.is_file() {
                return Err(Error::ModelNotFound(path.to_path_buf()));
            }
        }

        let config = ModelConfig::load(config_path)
            .map_err(|e| Error::parsing(config_path, e))?;

        let tokenizer = WordTokenizer::load(tokenizer_path)?;

        log::debug!("Loading weights from {}", model_path.display());

        let record = CompactRecorder::new()
            .load(record_path(model_path), device)
            .map_err(|e| Error::parsing(model_path, e))?;

        let model = config.init::<B>(device).load_record(record);

        Ok(Self::new(model, config, tokenizer, device.clone()))
    }

    /// Load from a directory holding the standard model, config and tokenizer file names
    pub fn load_dir(dir: &Path, device: &B::Device) -> Result<Self, Error> {
        Self::load(
            &dir.join(MODEL_FILE),
            &dir.join(MODEL_CONFIG_FILE),
            &dir.join(TOKENIZER_FILE),
            device,
        )
    }

    /// Save the weights, configuration and tokenizer
    pub fn save(&self, model_path: &Path, config_path: &Path, tokenizer_path: &Path) -> Result<(), Error> {
        for path in [model_path, config_path, tokenizer_path] {
            crate::utils::files::ensure_parent(path)?;
        }

        self.config.save(config_path)?;
        self.tokenizer.save(tokenizer_path)?;

        CompactRecorder::new()
            .record(self.model.clone().into_record(), record_path(model_path))
            .map_err(|e| Error::Training(format!("unable to save model weights: {}", e)))?;

        Ok(())
    }

    /// The model configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Probability of the positive class for each text
    pub fn predict_proba<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<f32>, Error> {
        let sequences = self.tokenizer.texts_to_sequences(texts)?;
        let batcher = Batcher::<B>::new(self.config.max_len, self.device.clone());

        Ok(self.model.predict(&batcher, sequences, INFERENCE_BATCH_SIZE))
    }

    /// Score the model against labeled texts
    pub fn score<S: AsRef<str>>(&self, texts: &[S], labels: &[u8]) -> Result<Score, Error> {
        if texts.len() != labels.len() {
            return Err(Error::Training(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let probabilities = self.predict_proba(texts)?;

        Ok(Score::from_probabilities(&probabilities, labels))
    }
}
