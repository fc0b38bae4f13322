use std::path::{Path, PathBuf};

use burn::config::Config as _;

use crate::error::Error;

/// File name of a serialized model record
pub static MODEL_FILE: &str = "model.mpk";

/// File name of a model architecture config
pub static MODEL_CONFIG_FILE: &str = "model.json";

/// File name of a fitted tokenizer
pub static TOKENIZER_FILE: &str = "tokenizer.json";

/// Name of the per-run directory holding a promoted model
pub static PUSHED_MODEL_DIR: &str = "pushed_model";

/// Data Ingestion settings
#[derive(burn::config::Config, Debug)]
pub struct IngestionConfig {
    /// The packaged dataset
    #[config(default = "\"data/dataset.zip\".to_string()")]
    pub archive_path: String,

    /// Name of the 3-class dataset inside the archive
    #[config(default = "\"raw_data.csv\".to_string()")]
    pub raw_file_name: String,

    /// Name of the binary dataset inside the archive
    #[config(default = "\"imbalanced_data.csv\".to_string()")]
    pub imbalanced_file_name: String,
}

/// Data Transformation settings
#[derive(burn::config::Config, Debug)]
pub struct TransformationConfig {
    /// Columns of the raw dataset that carry nothing the model uses
    #[config(
        default = "vec![\"Unnamed: 0\".to_string(), \"count\".to_string(), \"hate_speech\".to_string(), \"offensive_language\".to_string(), \"neither\".to_string()]"
    )]
    pub raw_drop_columns: Vec<String>,

    /// Identifier column of the imbalanced dataset
    #[config(default = "\"id\".to_string()")]
    pub id_column: String,

    /// The 3-valued class column of the raw dataset
    #[config(default = "\"class\".to_string()")]
    pub class_column: String,

    /// Canonical binary label column
    #[config(default = "\"label\".to_string()")]
    pub label_column: String,

    /// Canonical text column
    #[config(default = "\"tweet\".to_string()")]
    pub text_column: String,
}

/// Model Trainer settings
#[derive(burn::config::Config, Debug)]
pub struct TrainerConfig {
    /// Vocabulary bound, including the padding and unknown ids
    #[config(default = 50000)]
    pub max_words: usize,

    /// Every sequence is padded or truncated to this length
    #[config(default = 300)]
    pub max_len: usize,

    /// Embedding width
    #[config(default = 100)]
    pub embedding_size: usize,

    /// LSTM hidden state width
    #[config(default = 100)]
    pub hidden_size: usize,

    /// Dropout rate applied to the embeddings
    #[config(default = 0.2)]
    pub dropout: f64,

    /// Number of epochs
    #[config(default = 1)]
    pub epochs: usize,

    /// Batch size
    #[config(default = 128)]
    pub batch_size: usize,

    /// Trailing fraction of the training rows used for per-epoch validation
    #[config(default = 0.2)]
    pub validation_split: f64,

    /// Held-out fraction for the train/test split
    #[config(default = 0.3)]
    pub test_fraction: f64,

    /// Seed for the split and the per-epoch shuffles
    #[config(default = 42)]
    pub seed: u64,

    /// RMSProp learning rate
    #[config(default = 1e-3)]
    pub learning_rate: f64,
}

/// HTTP server settings
#[derive(burn::config::Config, Debug)]
pub struct ServerConfig {
    /// Interface to bind
    #[config(default = "\"127.0.0.1\".to_string()")]
    pub host: String,

    /// Port to bind
    #[config(default = 8080)]
    pub port: u16,
}

/// Application configuration, constructed once at process start
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Root under which every run directory is created
    #[config(default = "\"artifacts\".to_string()")]
    pub artifacts_root: String,

    /// Data Ingestion
    #[config(default = "IngestionConfig::new()")]
    pub ingestion: IngestionConfig,

    /// Data Transformation
    #[config(default = "TransformationConfig::new()")]
    pub transformation: TransformationConfig,

    /// Model Trainer
    #[config(default = "TrainerConfig::new()")]
    pub trainer: TrainerConfig,

    /// HTTP server
    #[config(default = "ServerConfig::new()")]
    pub server: ServerConfig,
}

impl Config {
    /// Load from a JSON file when one is given, otherwise use the defaults
    pub fn from_file(path: Option<&str>) -> Result<Self, Error> {
        let config = match path {
            Some(path) => Config::load(path)
                .map_err(|e| Error::Config(format!("unable to load {}: {}", path, e)))?,
            None => Config::new(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Reject values no stage can work with
    pub fn validate(&self) -> Result<(), Error> {
        let trainer = &self.trainer;

        if trainer.max_words < 3 {
            return Err(Error::Config(format!(
                "max_words must be at least 3, got {}",
                trainer.max_words
            )));
        }

        if trainer.max_len == 0 {
            return Err(Error::Config("max_len must be positive".to_string()));
        }

        if trainer.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".to_string()));
        }

        for (name, value) in [
            ("test_fraction", trainer.test_fraction),
            ("validation_split", trainer.validation_split),
            ("dropout", trainer.dropout),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be in [0, 1), got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// The root directory holding every run
    pub fn artifacts_root(&self) -> &Path {
        Path::new(&self.artifacts_root)
    }
}

/// Every path produced by a single training run
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    run_dir: PathBuf,
}

impl Layout {
    /// The layout of the run with the given id under `artifacts_root`
    pub fn new(artifacts_root: impl AsRef<Path>, run_id: &str) -> Self {
        Self {
            run_dir: artifacts_root.as_ref().join(run_id),
        }
    }

    /// A layout for a run starting now. Run ids sort in creation order.
    pub fn for_new_run(config: &Config) -> Self {
        let run_id = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();

        Self::new(config.artifacts_root(), &run_id)
    }

    /// The run directory
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Data Ingestion outputs
    pub fn ingestion_dir(&self) -> PathBuf {
        self.run_dir.join("data_ingestion")
    }

    /// Where the archive is extracted
    pub fn extract_dir(&self) -> PathBuf {
        self.ingestion_dir().join("extracted")
    }

    /// Copied raw dataset
    pub fn raw_data_path(&self) -> PathBuf {
        self.ingestion_dir().join("raw_data.csv")
    }

    /// Copied imbalanced dataset
    pub fn imbalanced_data_path(&self) -> PathBuf {
        self.ingestion_dir().join("imbalanced_data.csv")
    }

    /// Combined, normalized dataset
    pub fn transformed_data_path(&self) -> PathBuf {
        self.run_dir.join("data_transformation").join("final.csv")
    }

    /// Model Trainer outputs
    pub fn trainer_dir(&self) -> PathBuf {
        self.run_dir.join("model_trainer")
    }

    /// Trained model record
    pub fn trained_model_path(&self) -> PathBuf {
        self.trainer_dir().join(MODEL_FILE)
    }

    /// Trained model architecture config
    pub fn model_config_path(&self) -> PathBuf {
        self.trainer_dir().join(MODEL_CONFIG_FILE)
    }

    /// Fitted tokenizer
    pub fn tokenizer_path(&self) -> PathBuf {
        self.trainer_dir().join(TOKENIZER_FILE)
    }

    /// Training text
    pub fn x_train_path(&self) -> PathBuf {
        self.trainer_dir().join("x_train.csv")
    }

    /// Training labels
    pub fn y_train_path(&self) -> PathBuf {
        self.trainer_dir().join("y_train.csv")
    }

    /// Held-out text
    pub fn x_test_path(&self) -> PathBuf {
        self.trainer_dir().join("x_test.csv")
    }

    /// Held-out labels
    pub fn y_test_path(&self) -> PathBuf {
        self.trainer_dir().join("y_test.csv")
    }

    /// Promoted model directory
    pub fn pushed_model_dir(&self) -> PathBuf {
        self.run_dir.join(PUSHED_MODEL_DIR)
    }
}

#[cfg(test)]
mod tests {
    use burn::config::Config as _;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::new();

        assert_eq!(config.trainer.max_len, 300);
        assert_eq!(config.trainer.seed, 42);
        assert_eq!(config.transformation.raw_drop_columns.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = Config::new();
        config.trainer.max_len = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::new();
        config.trainer.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::new().with_artifacts_root("elsewhere".to_string());
        config.trainer.epochs = 3;
        config.save(&path).unwrap();

        let loaded = Config::from_file(path.to_str()).unwrap();

        assert_eq!(loaded.artifacts_root, "elsewhere");
        assert_eq!(loaded.trainer.epochs, 3);
    }

    #[test]
    fn layout_nests_under_run_dir() {
        let layout = Layout::new("artifacts", "20240101_000000");

        assert_eq!(
            layout.pushed_model_dir(),
            PathBuf::from("artifacts/20240101_000000/pushed_model")
        );
        assert_eq!(
            layout.trained_model_path(),
            PathBuf::from("artifacts/20240101_000000/model_trainer/model.mpk")
        );
    }
}
