use std::path::{Path, PathBuf};

use crate::{
    artifacts::{ModelEvaluationArtifact, ModelTrainerArtifact},
    config::Config,
    dataset::{read_label_column, read_text_column},
    error::Error,
    models::{lstm::Classifier, metrics::Score},
    pipelines::latest_pushed_model_dir,
    Backend,
};

/// Compares the freshly trained model against the current best one
pub struct ModelEvaluation<'a> {
    artifacts_root: &'a Path,
}

impl<'a> ModelEvaluation<'a> {
    /// Create the stage for one run
    pub fn new(config: &'a Config) -> Self {
        Self {
            artifacts_root: config.artifacts_root(),
        }
    }

    /// Score both models on the held-out set and decide whether to promote
    pub fn initiate(&self, trainer: &ModelTrainerArtifact) -> Result<ModelEvaluationArtifact, Error> {
        log::info!("Starting model evaluation");

        let texts = read_text_column(&trainer.x_test_path)?;
        let labels = read_label_column(&trainer.y_test_path)?;

        let device = Default::default();

        let trained = Classifier::<Backend>::load(
            &trainer.trained_model_path,
            &trainer.model_config_path,
            &trainer.tokenizer_path,
            &device,
        )?;
        let trained_accuracy = evaluate(&trained, &texts, &labels)?.accuracy;

        log::info!("Trained model accuracy: {:.4}", trained_accuracy);

        let best_accuracy = match self.best_model_dir()? {
            Some(dir) => {
                log::info!("Comparing against the best model in {}", dir.display());

                let best = Classifier::<Backend>::load_dir(&dir, &device)?;
                let accuracy = evaluate(&best, &texts, &labels)?.accuracy;

                log::info!("Best model accuracy: {:.4}", accuracy);

                Some(accuracy)
            }
            None => {
                log::info!("No promoted model found, accepting the trained model");

                None
            }
        };

        let accepted = is_model_accepted(trained_accuracy, best_accuracy);

        log::info!("Model evaluation finished, accepted: {}", accepted);

        Ok(ModelEvaluationArtifact::new(
            accepted,
            trained_accuracy,
            best_accuracy,
        ))
    }

    /// The latest promoted model, if any
    fn best_model_dir(&self) -> Result<Option<PathBuf>, Error> {
        match latest_pushed_model_dir(self.artifacts_root) {
            Ok(dir) => Ok(Some(dir)),
            Err(Error::ModelNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Score a model on a held-out set and log its confusion matrix
pub fn evaluate<S: AsRef<str>>(
    classifier: &Classifier<Backend>,
    texts: &[S],
    labels: &[u8],
) -> Result<Score, Error> {
    let score = classifier.score(texts, labels)?;

    log::info!(
        "Test loss {:.4}, accuracy {:.4}, confusion matrix:\n{}",
        score.loss,
        score.accuracy,
        score.confusion
    );

    Ok(score)
}

/// A trained model is promoted when nothing has been promoted yet, or when it is strictly more
/// accurate than the current best
pub fn is_model_accepted(trained_accuracy: f64, best_accuracy: Option<f64>) -> bool {
    match best_accuracy {
        None => true,
        Some(best) => trained_accuracy > best,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_model_is_always_accepted() {
        assert!(is_model_accepted(0.1, None));
    }

    #[test]
    fn better_model_is_accepted() {
        assert!(is_model_accepted(0.80, Some(0.75)));
    }

    #[test]
    fn ties_and_regressions_are_rejected() {
        assert!(!is_model_accepted(0.75, Some(0.75)));
        assert!(!is_model_accepted(0.70, Some(0.75)));
    }
}
