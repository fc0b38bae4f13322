/// Data Ingestion
pub mod ingestion;

/// Data Transformation
pub mod transformation;

/// Model Trainer
pub mod trainer;

/// Model Evaluation
pub mod evaluation;

/// Model Pusher
pub mod pusher;

pub use evaluation::ModelEvaluation;
pub use ingestion::DataIngestion;
pub use pusher::ModelPusher;
pub use trainer::ModelTrainer;
pub use transformation::DataTransformation;
