//! # Hate Speech Classifier
#![forbid(unsafe_code)]

/// Artifact records passed between pipeline stages
pub mod artifacts;

/// Pipeline stages
pub mod components;

/// Configuration and artifact layout
pub mod config;

/// The combined tweet dataset
pub mod dataset;

/// Error taxonomy
pub mod error;

/// The sequence model and its training loop
pub mod models;

/// Training and prediction pipelines
pub mod pipelines;

/// HTTP serving layer
pub mod server;

/// Text cleaning and tokenization
pub mod text;

/// Utilities
pub mod utils;

pub use config::Config;
pub use error::{Error, PipelineError, Stage};

/// The backend used for inference and evaluation
pub type Backend = burn::backend::NdArray;

/// The backend used for training
pub type TrainingBackend = burn::backend::Autodiff<Backend>;
