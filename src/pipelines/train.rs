use crate::{
    artifacts::ModelPusherArtifact,
    components::{DataIngestion, DataTransformation, ModelEvaluation, ModelPusher, ModelTrainer},
    config::{Config, Layout},
    error::{PipelineError, Stage},
};

/// Runs every stage of a training run in order: ingest, transform, train, evaluate, push
pub struct TrainPipeline<'a> {
    config: &'a Config,
    layout: Layout,
}

impl<'a> TrainPipeline<'a> {
    /// A pipeline writing to a fresh run directory
    pub fn new(config: &'a Config) -> Self {
        Self::with_layout(config, Layout::for_new_run(config))
    }

    /// A pipeline writing to the given run directory
    pub fn with_layout(config: &'a Config, layout: Layout) -> Self {
        Self { config, layout }
    }

    /// The run directory this pipeline writes to
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Run the pipeline. A stage failure stops the run; a rejected model ends it with
    /// [`PipelineError::ModelNotImproved`].
    pub fn run(&self) -> Result<ModelPusherArtifact, PipelineError> {
        log::info!(
            "Starting train pipeline in {}",
            self.layout.run_dir().display()
        );

        let ingestion = DataIngestion::new(self.config, &self.layout)
            .initiate()
            .map_err(PipelineError::at(Stage::Ingestion))?;

        let transformation = DataTransformation::new(self.config, &self.layout)
            .initiate(&ingestion)
            .map_err(PipelineError::at(Stage::Transformation))?;

        let trainer = ModelTrainer::new(self.config, &self.layout)
            .initiate(&transformation)
            .map_err(PipelineError::at(Stage::Training))?;

        let evaluation = ModelEvaluation::new(self.config)
            .initiate(&trainer)
            .map_err(PipelineError::at(Stage::Evaluation))?;

        if !evaluation.is_model_accepted {
            log::warn!(
                "Trained model accuracy {:.4} does not beat the best model's {:.4}, not pushing",
                evaluation.trained_accuracy,
                evaluation.best_accuracy.unwrap_or_default()
            );

            return Err(PipelineError::ModelNotImproved);
        }

        let pusher = ModelPusher::new(&self.layout)
            .initiate(&trainer)
            .map_err(PipelineError::at(Stage::Pusher))?;

        log::info!("Train pipeline finished");

        Ok(pusher)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        fmt::Write as _,
        path::{Path, PathBuf},
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        components::{ingestion::tests::write_zip, trainer::tests::tiny_config},
        config::PUSHED_MODEL_DIR,
        error::Error,
        pipelines::PredictionPipeline,
    };

    /// Package a small, easily separable copy of both source tables
    pub(crate) fn write_dataset_archive(dir: &Path) -> PathBuf {
        let archive = dir.join("dataset.zip");

        let mut raw = String::from(
            "Unnamed: 0,count,hate_speech,offensive_language,neither,class,tweet\n",
        );
        let mut imbalanced = String::from("id,label,tweet\n");

        for i in 0..12 {
            writeln!(raw, "{},3,3,0,0,0,I hate you stupid idiot", i).unwrap();
            writeln!(raw, "{},3,0,0,3,2,What a lovely sunny day", i + 100).unwrap();
            writeln!(imbalanced, "{},1,You are a disgusting idiot", i).unwrap();
            writeln!(imbalanced, "{},0,Enjoying coffee with friends", i + 100).unwrap();
        }

        write_zip(
            &archive,
            &[("raw_data.csv", raw.as_str()), ("imbalanced_data.csv", imbalanced.as_str())],
        );

        archive
    }

    #[test]
    fn missing_archive_stops_at_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.artifacts_root = dir.path().to_string_lossy().into_owned();
        config.ingestion.archive_path = dir.path().join("absent.zip").to_string_lossy().into_owned();

        let result = TrainPipeline::new(&config).run();

        match result {
            Err(PipelineError::Stage { stage, source }) => {
                assert_eq!(stage, Stage::Ingestion);
                assert!(matches!(source, Error::MissingInput(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn second_run_without_improvement_keeps_the_promoted_model() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_dataset_archive(dir.path());
        let root = dir.path().join("artifacts");

        let mut config = tiny_config(&root);
        config.ingestion.archive_path = archive.to_string_lossy().into_owned();
        config.trainer.epochs = 40;
        config.trainer.learning_rate = 0.02;
        config.trainer.dropout = 0.0;

        let first = Layout::new(&root, "20240101_000000");
        let second = Layout::new(&root, "20240102_000000");

        TrainPipeline::with_layout(&config, first.clone())
            .run()
            .unwrap();

        // The first model separates the four distinct texts, so nothing can strictly beat it
        let result = TrainPipeline::with_layout(&config, second.clone()).run();

        assert!(matches!(result, Err(PipelineError::ModelNotImproved)));
        assert!(second.trained_model_path().is_file());
        assert!(!second.run_dir().join(PUSHED_MODEL_DIR).exists());

        let pipeline = PredictionPipeline::new(&config).unwrap();
        assert_eq!(pipeline.model_dir(), first.pushed_model_dir());
    }
}
