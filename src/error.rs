use std::path::PathBuf;
use thiserror::Error;

/// Error types for the lloyd-kmeans library
#[derive(Error, Debug)]
pub enum KMeansError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Parallel execution was requested with no workers
    #[error("Invalid thread count: {0}")]
    InvalidThreadCount(String),

    /// Seed points are out of range or repeated
    #[error("Invalid seed points: {0}")]
    InvalidSeeds(String),

    /// Model has not been fitted yet, or the last run declined to cluster
    #[error("Model has not been fitted. Call train() or fit() first.")]
    NotFitted,

    /// Dimension mismatch between data and model
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// An input file could not be opened or read
    #[error("Could not open {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input content is malformed or truncated
    #[error("Parse error: {0}")]
    Parse(String),

    /// The worker pool for parallel execution could not be created
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
