//! # news-summarizer
//!
//! Title and summary generation for article clusters.
//!
//! A [`Summarizer`] receives the texts of a cluster's representative
//! articles and returns a short title plus a one-line summary.
//!
//! ## Implementations
//! - [`ApiSummarizer`]: OpenAI-compatible or Anthropic chat API
//! - [`FallbackSummarizer`]: wraps another summarizer and degrades to a
//!   generic title/summary on failure
//! - [`MockSummarizer`]: deterministic output for tests

mod api;
mod fallback;
mod mock;
pub mod prompt;

pub use api::{ApiSummarizer, ApiSummarizerConfig};
pub use fallback::FallbackSummarizer;
pub use mock::MockSummarizer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used when no summary could be produced.
pub const FALLBACK_TITLE: &str = "주제 클러스터";

/// Summary used when no summary could be produced.
pub const FALLBACK_SUMMARY: &str = "관련 기사들의 모음";

/// Error type for summarization operations.
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("No articles to summarize")]
    NoArticles,
}

impl SummarizerError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SummarizerError::ApiError(_) | SummarizerError::RateLimitExceeded | SummarizerError::Timeout
        )
    }
}

/// Generated title and summary for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub title: String,
    pub summary: String,
}

impl ClusterSummary {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }

    /// The generic pair reported when summarization fails.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_TITLE, FALLBACK_SUMMARY)
    }

    pub fn is_fallback(&self) -> bool {
        self.title == FALLBACK_TITLE && self.summary == FALLBACK_SUMMARY
    }
}

/// Pluggable cluster summarizer.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the given article texts as one topic.
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError>;
}

#[async_trait]
impl<S: Summarizer + ?Sized> Summarizer for Arc<S> {
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError> {
        (**self).summarize(articles).await
    }
}
