//! The clustering pipeline: embed, cluster, pick representatives, summarize.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use news_clustering::{
    select_representatives, ClusteringConfig, DensityClusterer, GroupKind, NoisePolicy, Partition,
    PartitionGroup,
};
use news_embeddings::{Embedding, LazyEmbedder, ModelCache};
use news_summarizer::{ApiSummarizer, ApiSummarizerConfig, FallbackSummarizer, Summarizer};
use news_types::{Article, ArticleCluster, Settings};

use crate::error::ServiceError;

/// Orchestrates one clustering request from articles to summarized clusters.
///
/// Holds no per-request state; every call recomputes clusters from scratch.
#[derive(Clone)]
pub struct NewsClusteringService {
    embedder: LazyEmbedder,
    clusterer: DensityClusterer,
    summarizer: Arc<dyn Summarizer>,
    concurrency: usize,
}

impl NewsClusteringService {
    pub fn new(
        embedder: LazyEmbedder,
        summarizer: Arc<dyn Summarizer>,
        config: ClusteringConfig,
        concurrency: usize,
    ) -> Result<Self, ServiceError> {
        if concurrency == 0 {
            return Err(ServiceError::Config(
                "summarizer concurrency must be > 0".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            clusterer: DensityClusterer::new(config)?,
            summarizer,
            concurrency,
        })
    }

    /// Production wiring: lazily loaded Candle embedder and the configured
    /// LLM API behind the fallback wrapper.
    pub fn from_settings(settings: &Settings) -> Result<Self, ServiceError> {
        let cache = match settings.expanded_cache_dir() {
            Some(dir) => ModelCache::new(dir, settings.embedding.repo_id.clone()),
            None => ModelCache::for_repo(settings.embedding.repo_id.clone()),
        };
        let embedder = LazyEmbedder::candle(cache, settings.embedding.batch_size);

        let api = ApiSummarizer::new(ApiSummarizerConfig::from_settings(&settings.summarizer)?)?;
        let summarizer = FallbackSummarizer::new(api, settings.summarizer.fallback_on_error);

        Self::new(
            embedder,
            Arc::new(summarizer),
            ClusteringConfig::from(&settings.clustering),
            settings.summarizer.concurrency,
        )
    }

    pub fn clustering_config(&self) -> &ClusteringConfig {
        self.clusterer.config()
    }

    /// Group articles into summarized clusters.
    ///
    /// Dense clusters come first in label order, followed by noise
    /// singletons when the noise policy keeps them.
    pub async fn process_articles(
        &self,
        articles: &[Article],
    ) -> Result<Vec<ArticleCluster>, ServiceError> {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let contents: Vec<String> = articles.iter().map(|a| a.content.clone()).collect();

        let embeddings: Vec<Vec<f32>> = self
            .embedder
            .embed_texts(contents.clone())
            .await?
            .into_iter()
            .map(Embedding::into_inner)
            .collect();

        if embeddings.len() != articles.len() {
            return Err(ServiceError::Task(format!(
                "expected {} embeddings, got {}",
                articles.len(),
                embeddings.len()
            )));
        }

        let clusterer = self.clusterer.clone();
        let (embeddings, assignment) = tokio::task::spawn_blocking(move || {
            let assignment = clusterer.cluster(&embeddings);
            (embeddings, assignment)
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?;
        let assignment = assignment?;

        let config = self.clusterer.config();
        let representatives: HashMap<i64, Vec<usize>> =
            select_representatives(&embeddings, &assignment, config.representatives)
                .into_iter()
                .map(|r| (i64::from(r.cluster_id), r.members))
                .collect();

        let partition = Partition::build(&assignment, config.noise_policy);
        debug!(
            groups = partition.len(),
            dense = partition.dense_count(),
            "Partition built"
        );

        let jobs: Vec<(PartitionGroup, Vec<String>)> = partition
            .into_groups()
            .into_iter()
            .map(|group| {
                let indices = match group.kind {
                    GroupKind::Dense => representatives
                        .get(&group.cluster_id)
                        .cloned()
                        .unwrap_or_else(|| group.members.clone()),
                    GroupKind::Noise => group.members.clone(),
                };
                let texts = indices.iter().map(|&i| contents[i].clone()).collect();
                (group, texts)
            })
            .collect();

        let clusters: Vec<ArticleCluster> = stream::iter(jobs)
            .map(|(group, texts)| {
                let summarizer = Arc::clone(&self.summarizer);
                async move {
                    let summary = summarizer.summarize(&texts).await?;
                    Ok::<_, ServiceError>(ArticleCluster {
                        cluster_id: group.cluster_id,
                        articles: group
                            .members
                            .iter()
                            .map(|&i| articles[i].id.clone())
                            .collect(),
                        topic_title: summary.title,
                        topic_summary: summary.summary,
                    })
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        info!(
            articles = articles.len(),
            clusters = clusters.len(),
            "Processed articles into clusters"
        );

        Ok(clusters)
    }

    pub fn noise_policy(&self) -> NoisePolicy {
        self.clusterer.config().noise_policy
    }
}

impl std::fmt::Debug for NewsClusteringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsClusteringService")
            .field("embedder", &self.embedder)
            .field("clusterer", &self.clusterer)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
