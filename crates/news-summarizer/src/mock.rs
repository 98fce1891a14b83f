//! Mock summarizer for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ClusterSummary, Summarizer, SummarizerError};

/// Mock summarizer that generates deterministic summaries.
///
/// Useful for testing without making API calls. The title is the prefix
/// followed by the first characters of the first article; the summary
/// states how many articles were given.
pub struct MockSummarizer {
    /// Prefix for generated titles
    title_prefix: String,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSummarizer {
    /// Create a new mock summarizer.
    pub fn new() -> Self {
        Self::with_title_prefix("Topic")
    }

    /// Create with custom title prefix.
    pub fn with_title_prefix(prefix: impl Into<String>) -> Self {
        Self {
            title_prefix: prefix.into(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A summarizer whose every call fails with an API error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Number of `summarize` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if articles.is_empty() {
            return Err(SummarizerError::NoArticles);
        }
        if self.fail {
            return Err(SummarizerError::ApiError("mock failure".to_string()));
        }

        let title = format!("{}: {}", self.title_prefix, truncate(&articles[0], 15));
        let summary = format!("{} related articles", articles.len());

        Ok(ClusterSummary::new(title, summary))
    }
}

/// First `max_chars` characters of the first line.
fn truncate(text: &str, max_chars: usize) -> String {
    text.lines()
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(max_chars)
        .collect()
}
