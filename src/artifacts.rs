use std::path::PathBuf;

use derive_new::new;

/// Output of Data Ingestion
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct DataIngestionArtifact {
    /// The copied raw (3-class) dataset
    pub raw_data_path: PathBuf,

    /// The copied imbalanced (binary) dataset
    pub imbalanced_data_path: PathBuf,
}

/// Output of Data Transformation
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct DataTransformationArtifact {
    /// The combined `{tweet, label}` dataset
    pub transformed_data_path: PathBuf,
}

/// Output of the Model Trainer
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct ModelTrainerArtifact {
    /// The serialized model record
    pub trained_model_path: PathBuf,

    /// The architecture config needed to rebuild the model
    pub model_config_path: PathBuf,

    /// The fitted tokenizer
    pub tokenizer_path: PathBuf,

    /// Held-out text
    pub x_test_path: PathBuf,

    /// Held-out labels
    pub y_test_path: PathBuf,
}

/// Output of Model Evaluation
#[derive(Clone, Debug, PartialEq, new)]
pub struct ModelEvaluationArtifact {
    /// Whether the trained model should be promoted
    pub is_model_accepted: bool,

    /// Held-out accuracy of the trained model
    pub trained_accuracy: f64,

    /// Held-out accuracy of the current best model, if there is one
    pub best_accuracy: Option<f64>,
}

/// Output of the Model Pusher
#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct ModelPusherArtifact {
    /// The directory the serving path reads from
    pub pushed_model_dir: PathBuf,

    /// The promoted model record
    pub model_file_path: PathBuf,

    /// The promoted tokenizer
    pub tokenizer_file_path: PathBuf,
}
