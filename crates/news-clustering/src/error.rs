//! Clustering error types.

use thiserror::Error;

/// Errors that can occur during clustering.
#[derive(Debug, Error)]
pub enum ClusteringError {
    /// HDBSCAN rejected the input or failed
    #[error("Clustering error: {0}")]
    Clustering(String),

    /// Embeddings do not share one dimension
    #[error("Dimension mismatch: expected {expected}, got {actual} at row {row}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        row: usize,
    },

    /// NaN or infinite component
    #[error("Non-finite value in embedding {0}")]
    NonFinite(usize),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
