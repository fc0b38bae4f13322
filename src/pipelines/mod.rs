/// The end-to-end training run
pub mod train;

/// Serving predictions from the latest promoted model
pub mod prediction;

pub use prediction::{latest_pushed_model_dir, Prediction, PredictionPipeline};
pub use train::TrainPipeline;
