use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use crate::{
    config::{Config, PUSHED_MODEL_DIR},
    error::Error,
    models::{lstm::Classifier, metrics::DECISION_THRESHOLD},
    text::clean_for_prediction,
    utils::files::sorted_subdirs,
    Backend,
};

/// The two possible verdicts
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Prediction {
    /// Hate speech or abusive language
    HateAndAbusive,

    /// Neither
    NoHate,
}

impl Prediction {
    /// Map a positive-class probability onto a verdict
    pub fn from_probability(probability: f32) -> Self {
        if probability > DECISION_THRESHOLD {
            Prediction::HateAndAbusive
        } else {
            Prediction::NoHate
        }
    }

    /// The label returned to callers
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::HateAndAbusive => "hate and abusive",
            Prediction::NoHate => "no hate",
        }
    }
}

impl Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `pushed_model` directory of the most recent run that promoted a model.
///
/// Run directories are named by sortable timestamps, so the last one by name is the newest.
pub fn latest_pushed_model_dir(artifacts_root: &Path) -> Result<PathBuf, Error> {
    if !artifacts_root.is_dir() {
        return Err(Error::ModelNotFound(artifacts_root.to_path_buf()));
    }

    sorted_subdirs(artifacts_root)?
        .into_iter()
        .map(|run_dir| run_dir.join(PUSHED_MODEL_DIR))
        .filter(|pushed| pushed.is_dir())
        .last()
        .ok_or_else(|| Error::ModelNotFound(artifacts_root.join(PUSHED_MODEL_DIR)))
}

/// Serves predictions from the latest promoted model
pub struct PredictionPipeline {
    classifier: Classifier<Backend>,
    model_dir: PathBuf,
}

impl PredictionPipeline {
    /// Load the latest promoted model under the configured artifacts root
    pub fn new(config: &Config) -> Result<Self, Error> {
        let model_dir = latest_pushed_model_dir(config.artifacts_root())?;

        Self::from_dir(&model_dir)
    }

    /// Load a promoted model from its directory
    pub fn from_dir(model_dir: &Path) -> Result<Self, Error> {
        log::debug!("Loading model from {}", model_dir.display());

        let classifier = Classifier::<Backend>::load_dir(model_dir, &Default::default())?;

        Ok(Self {
            classifier,
            model_dir: model_dir.to_path_buf(),
        })
    }

    /// The directory the model was loaded from
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Classify a single raw text
    pub fn predict(&self, text: &str) -> Result<Prediction, Error> {
        let cleaned = clean_for_prediction(text);

        let probability = self
            .classifier
            .predict_proba(&[cleaned])?
            .first()
            .copied()
            .unwrap_or_default();

        log::debug!("Probability {:.4} for {:?}", probability, text);

        Ok(Prediction::from_probability(probability))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        components::trainer::tests::tiny_config,
        config::Layout,
        pipelines::{train::tests::write_dataset_archive, TrainPipeline},
    };

    #[test]
    fn verdict_threshold_is_exclusive() {
        assert_eq!(Prediction::from_probability(0.5), Prediction::NoHate);
        assert_eq!(Prediction::from_probability(0.51), Prediction::HateAndAbusive);
        assert_eq!(Prediction::HateAndAbusive.to_string(), "hate and abusive");
    }

    #[test]
    fn discovers_the_latest_promoted_run() {
        let dir = tempfile::tempdir().unwrap();

        for run in ["20240101_000000", "20240102_000000"] {
            fs::create_dir_all(dir.path().join(run).join(PUSHED_MODEL_DIR)).unwrap();
        }
        fs::create_dir_all(dir.path().join("20240103_000000").join("model_trainer")).unwrap();

        assert_eq!(
            latest_pushed_model_dir(dir.path()).unwrap(),
            dir.path().join("20240102_000000").join(PUSHED_MODEL_DIR)
        );
    }

    #[test]
    fn missing_root_or_model_fails_fast() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            latest_pushed_model_dir(&dir.path().join("absent")),
            Err(Error::ModelNotFound(_))
        ));
        assert!(matches!(
            latest_pushed_model_dir(dir.path()),
            Err(Error::ModelNotFound(_))
        ));

        let empty = dir.path().join("run").join(PUSHED_MODEL_DIR);
        fs::create_dir_all(&empty).unwrap();

        assert!(matches!(
            PredictionPipeline::from_dir(&empty),
            Err(Error::ModelNotFound(_))
        ));
    }

    #[test]
    fn trains_promotes_and_predicts() {
        let dir = tempfile::tempdir().unwrap();
        let archive = write_dataset_archive(dir.path());

        let root = dir.path().join("artifacts");
        let mut config = tiny_config(&root);
        config.ingestion.archive_path = archive.to_string_lossy().into_owned();

        let layout = Layout::new(&root, "20240101_000000");
        let pushed = TrainPipeline::with_layout(&config, layout.clone())
            .run()
            .unwrap();

        assert_eq!(pushed.pushed_model_dir, layout.pushed_model_dir());

        let pipeline = PredictionPipeline::new(&config).unwrap();
        assert_eq!(pipeline.model_dir(), layout.pushed_model_dir());

        for text in ["I hate you, idiot! @someone #angry http://t.co/x", "", "   "] {
            let prediction = pipeline.predict(text).unwrap();

            assert!(matches!(
                prediction,
                Prediction::HateAndAbusive | Prediction::NoHate
            ));
        }
    }
}
