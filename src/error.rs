use std::{fmt::Display, path::PathBuf};

/// Errors raised by an individual pipeline stage
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required input file or directory does not exist
    #[error("required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A CSV file was malformed or did not match the expected schema
    #[error("unable to parse {}: {message}", path.display())]
    Parsing {
        /// The offending file
        path: PathBuf,

        /// What went wrong
        message: String,
    },

    /// The model could not be trained
    #[error("training failed: {0}")]
    Training(String),

    /// A model, model config or tokenizer needed for serving is missing or unreadable
    #[error("model/tokenizer not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// The tokenizer could not be built, saved, loaded or applied
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// The configuration holds a value no stage can work with
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The dataset archive could not be read
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parsing error for the given file
    pub fn parsing(path: impl Into<PathBuf>, message: impl Display) -> Self {
        Error::Parsing {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// The stage of the training pipeline an error originated from
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Stage {
    /// Data Ingestion
    Ingestion,

    /// Data Transformation
    Transformation,

    /// Model Trainer
    Training,

    /// Model Evaluation
    Evaluation,

    /// Model Pusher
    Pusher,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Ingestion => "data ingestion",
            Stage::Transformation => "data transformation",
            Stage::Training => "model trainer",
            Stage::Evaluation => "model evaluation",
            Stage::Pusher => "model pusher",
        };

        write!(f, "{}", name)
    }
}

/// Terminal outcomes of a training pipeline run other than success
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A stage failed; the run must be restarted from the beginning
    #[error("{stage} stage failed: {source}")]
    Stage {
        /// The stage that failed
        stage: Stage,

        /// The underlying failure
        #[source]
        source: Error,
    },

    /// The trained model did not beat the current best model
    #[error("trained model is not better than the existing model")]
    ModelNotImproved,
}

impl PipelineError {
    /// Returns a closure that wraps a stage error with its originating stage
    pub fn at(stage: Stage) -> impl FnOnce(Error) -> Self {
        move |source| PipelineError::Stage { stage, source }
    }
}
