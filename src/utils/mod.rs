/// File utilities
pub mod files;

/// Logger setup for the binaries
pub mod logging;

/// Tensor Utilities
pub mod tensors;
