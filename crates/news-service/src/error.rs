//! Service error types.

use thiserror::Error;

use news_clustering::ClusteringError;
use news_embeddings::EmbeddingError;
use news_summarizer::SummarizerError;
use news_types::NewsError;

/// Errors raised while running the clustering pipeline.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request rejected before processing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Clustering failed: {0}")]
    Clustering(#[from] ClusteringError),

    #[error("Summarization failed: {0}")]
    Summarizer(#[from] SummarizerError),

    /// Background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<NewsError> for ServiceError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            NewsError::Config(msg) => ServiceError::Config(msg),
            other => ServiceError::InvalidInput(other.to_string()),
        }
    }
}
