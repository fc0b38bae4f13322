use crate::{
    artifacts::{ModelPusherArtifact, ModelTrainerArtifact},
    config::{Layout, MODEL_CONFIG_FILE, MODEL_FILE, TOKENIZER_FILE},
    error::Error,
    utils::files::copy_file,
};

/// Promotes an accepted model by copying it into the run's `pushed_model` directory
pub struct ModelPusher<'a> {
    layout: &'a Layout,
}

impl<'a> ModelPusher<'a> {
    /// Create the stage for one run
    pub fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Copy the model record, model config and tokenizer
    pub fn initiate(&self, trainer: &ModelTrainerArtifact) -> Result<ModelPusherArtifact, Error> {
        log::info!("Starting model pusher");

        let pushed_model_dir = self.layout.pushed_model_dir();
        let model_file_path = pushed_model_dir.join(MODEL_FILE);
        let tokenizer_file_path = pushed_model_dir.join(TOKENIZER_FILE);

        for (source, target) in [
            (&trainer.trained_model_path, &model_file_path),
            (&trainer.model_config_path, &pushed_model_dir.join(MODEL_CONFIG_FILE)),
            (&trainer.tokenizer_path, &tokenizer_file_path),
        ] {
            if !source.is_file() {
                return Err(Error::MissingInput(source.clone()));
            }

            copy_file(source, target)?;
        }

        log::info!("Model pushed to {}", pushed_model_dir.display());

        Ok(ModelPusherArtifact::new(
            pushed_model_dir,
            model_file_path,
            tokenizer_file_path,
        ))
    }
}
