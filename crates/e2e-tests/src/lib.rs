//! End-to-end test infrastructure for news-clusterer.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full articles-to-summarized-clusters pipeline.
//!
//! Embeddings come from a keyword embedder with one axis per topic plus a
//! shared "news" axis, so topic articles sit close together and an article
//! without any topic keyword is an unambiguous outlier.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use news_clustering::ClusteringConfig;
use news_embeddings::{EmbeddingModel, KeywordEmbedder, LazyEmbedder};
use news_service::{serve_listener, ApiConfig, AppState, NewsClusteringService, ServiceError};
use news_summarizer::{ClusterSummary, MockSummarizer, Summarizer, SummarizerError};
use news_types::Article;

pub const POLITICS: [&str; 6] = ["election", "vote", "ballot", "parliament", "senate", "campaign"];
pub const SPORTS: [&str; 6] = ["football", "goal", "match", "league", "coach", "stadium"];
pub const ECONOMY: [&str; 6] = ["inflation", "stocks", "market", "bank", "tariff", "earnings"];

/// Embedder that separates the three test topics.
pub fn topic_embedder() -> LazyEmbedder {
    LazyEmbedder::ready(Arc::new(KeywordEmbedder::new([
        POLITICS.to_vec(),
        SPORTS.to_vec(),
        ECONOMY.to_vec(),
        vec!["news"],
    ])) as Arc<dyn EmbeddingModel>)
}

/// Create `count` articles about one topic.
///
/// Article `i` mentions the first `i + 1` keywords, so no two articles embed
/// to the same point.
pub fn topic_articles(prefix: &str, keywords: &[&str], count: usize) -> Vec<Article> {
    assert!(
        count <= keywords.len(),
        "at most {} distinct articles per topic",
        keywords.len()
    );

    (0..count)
        .map(|i| {
            let content = format!("{} news", keywords[..=i].join(" "));
            Article::new(format!("{}{}", prefix, i + 1), content)
        })
        .collect()
}

/// An article that matches no topic and no shared keyword.
pub fn outlier_article(id: &str) -> Article {
    Article::new(id, "Local bakery wins pastry award")
}

/// Ids of `articles`, sorted.
pub fn sorted_ids(articles: &[Article]) -> Vec<String> {
    let mut ids: Vec<String> = articles.iter().map(|a| a.id.clone()).collect();
    ids.sort();
    ids
}

/// Summarizer that records every batch of texts it is given.
#[derive(Default)]
pub struct RecordingSummarizer {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text batches received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Summarizer for RecordingSummarizer {
    async fn summarize(&self, articles: &[String]) -> Result<ClusterSummary, SummarizerError> {
        if articles.is_empty() {
            return Err(SummarizerError::NoArticles);
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(articles.to_vec());
        }
        Ok(ClusterSummary::new(
            articles[0].clone(),
            format!("{} representative articles", articles.len()),
        ))
    }
}

/// Shared test harness for E2E tests.
///
/// Owns a temp directory for input and output files and the service under
/// test.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    pub service: NewsClusteringService,
}

impl TestHarness {
    /// Harness with the topic embedder, default clustering and a mock summarizer.
    pub fn new() -> Self {
        Self::with_summarizer(Arc::new(MockSummarizer::new()))
    }

    pub fn with_summarizer(summarizer: Arc<dyn Summarizer>) -> Self {
        Self::with_config(ClusteringConfig::default(), summarizer)
    }

    pub fn with_config(config: ClusteringConfig, summarizer: Arc<dyn Summarizer>) -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let service = NewsClusteringService::new(topic_embedder(), summarizer, config, 4)
            .expect("Failed to build clustering service");

        Self {
            _temp_dir: temp_dir,
            service,
        }
    }

    /// Write `contents` to a file in the harness temp dir.
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Path inside the harness temp dir (not created).
    pub fn path(&self, name: &str) -> PathBuf {
        self._temp_dir.path().join(name)
    }

    /// Serve the API on an ephemeral local port.
    pub async fn spawn_server(&self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let state = AppState::new(self.service.clone(), ApiConfig::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_listener(listener, state, async move {
            let _ = shutdown_rx.await;
        }));

        TestServer {
            addr,
            shutdown_tx,
            handle,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A running API server bound to a local port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), ServiceError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Signal shutdown and wait for the server task to finish.
    pub async fn shutdown(self) -> Result<(), ServiceError> {
        let _ = self.shutdown_tx.send(());
        self.handle.await.expect("Server task panicked")
    }
}
