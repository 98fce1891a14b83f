//! Summarizer wrapper that degrades to the generic title/summary.

use async_trait::async_trait;
use tracing::warn;

use super::{ClusterSummary, Summarizer, SummarizerError};

/// Wraps a summarizer so that a failing LLM call does not fail the request.
///
/// With fallback enabled, errors are logged and replaced by
/// [`ClusterSummary::fallback`]. [`SummarizerError::NoArticles`] is always
/// propagated since it indicates a caller bug rather than a provider failure.
pub struct FallbackSummarizer<S> {
    inner: S,
    enabled: bool,
}

impl<S: Summarizer> FallbackSummarizer<S> {
    pub fn new(inner: S, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Summarizer> Summarizer for FallbackSummarizer<S> {
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError> {
        match self.inner.summarize(articles).await {
            Ok(summary) => Ok(summary),
            Err(SummarizerError::NoArticles) => Err(SummarizerError::NoArticles),
            Err(e) if self.enabled => {
                warn!(error = %e, articles = articles.len(), "Summarization failed, using fallback");
                Ok(ClusterSummary::fallback())
            }
            Err(e) => Err(e),
        }
    }
}
