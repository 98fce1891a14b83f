//! Lazily loaded embedder shared across requests.
//!
//! The model is loaded on the first call that needs it, on a blocking
//! thread, and reused for the life of the process.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::ModelCache;
use crate::candle::CandleEmbedder;
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel};

type Loader = Arc<dyn Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync>;

/// Async facade over an [`EmbeddingModel`] that loads it on first use.
#[derive(Clone)]
pub struct LazyEmbedder {
    loader: Loader,
    model: Arc<OnceCell<Arc<dyn EmbeddingModel>>>,
}

impl LazyEmbedder {
    /// Create from an arbitrary loader. The loader runs at most once
    /// successfully; a failed load is retried on the next call.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
            model: Arc::new(OnceCell::new()),
        }
    }

    /// Candle embedder backed by the given model cache.
    pub fn candle(cache: ModelCache, batch_size: usize) -> Self {
        Self::new(move || {
            let embedder = CandleEmbedder::load(&cache, batch_size)?;
            Ok(Arc::new(embedder) as Arc<dyn EmbeddingModel>)
        })
    }

    /// Wrap an already loaded model.
    pub fn ready(model: Arc<dyn EmbeddingModel>) -> Self {
        let cell = OnceCell::new_with(Some(model.clone()));
        Self {
            loader: Arc::new(move || Ok::<_, EmbeddingError>(model.clone())),
            model: Arc::new(cell),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Get the model, loading it if needed.
    pub async fn model(&self) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                let loader = self.loader.clone();
                let model = tokio::task::spawn_blocking(move || (*loader)())
                    .await
                    .map_err(|e| EmbeddingError::Task(e.to_string()))??;
                info!(model = %model.info().name, dim = model.info().dimension, "Embedder ready");
                Ok::<_, EmbeddingError>(model)
            })
            .await?;
        Ok(model.clone())
    }

    /// Embed texts on a blocking thread, preserving input order.
    pub async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model().await?;
        tokio::task::spawn_blocking(move || model.embed_texts(&texts))
            .await
            .map_err(|e| EmbeddingError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for LazyEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyEmbedder")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyEmbedder::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockEmbedder::new(8)) as Arc<dyn EmbeddingModel>)
        });

        assert!(!lazy.is_loaded());
        lazy.embed_texts(vec!["a".into()]).await.unwrap();
        lazy.embed_texts(vec!["b".into(), "c".into()]).await.unwrap();

        assert!(lazy.is_loaded());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_skips_loading() {
        let lazy = LazyEmbedder::new(|| Err(EmbeddingError::ModelNotFound("nope".into())));
        let embeddings = lazy.embed_texts(vec![]).await.unwrap();
        assert!(embeddings.is_empty());
        assert!(!lazy.is_loaded());
    }

    #[tokio::test]
    async fn test_load_failure_is_reported_and_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyEmbedder::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(EmbeddingError::ModelNotFound("config.json".into()))
        });

        let first = lazy.embed_texts(vec!["x".into()]).await;
        let second = lazy.embed_texts(vec!["x".into()]).await;

        assert!(matches!(first, Err(EmbeddingError::ModelNotFound(_))));
        assert!(second.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_ready_preserves_order() {
        let lazy = LazyEmbedder::ready(Arc::new(MockEmbedder::new(16)));
        assert!(lazy.is_loaded());

        let texts = vec!["first".to_string(), "second".to_string()];
        let embeddings = lazy.embed_texts(texts.clone()).await.unwrap();
        let direct = MockEmbedder::new(16).embed_texts(&texts).unwrap();
        assert_eq!(embeddings, direct);
    }
}
