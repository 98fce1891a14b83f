//! Deterministic embedders for tests and offline runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Hash-based embedder: identical texts get identical unit vectors, distinct
/// texts get unrelated ones.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    info: ModelInfo,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            info: ModelInfo {
                name: "mock-hash".to_string(),
                dimension: dimension.max(1),
                max_sequence_length: usize::MAX,
            },
        }
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        (0..self.info.dimension)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i.hash(&mut hasher);
                let h = hasher.finish();
                (((h as f64) / (u64::MAX as f64)) * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingModel for MockEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|t| Embedding::new(self.hash_to_vector(t)))
            .collect())
    }
}

/// Topic-aware embedder driven by keyword groups.
///
/// Each group owns one axis; a text scores one point on an axis per keyword
/// it contains (case-insensitive). A final baseline axis keeps texts with no
/// keywords off the origin. Texts sharing a topic therefore land on the same
/// direction, which makes clustering outcomes predictable in tests.
#[derive(Debug, Clone)]
pub struct KeywordEmbedder {
    groups: Vec<Vec<String>>,
    info: ModelInfo,
}

impl KeywordEmbedder {
    pub fn new<G, K>(groups: G) -> Self
    where
        G: IntoIterator<Item = K>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let groups: Vec<Vec<String>> = groups
            .into_iter()
            .map(|g| g.into_iter().map(|k| k.into().to_lowercase()).collect())
            .collect();
        let dimension = groups.len() + 1;
        Self {
            groups,
            info: ModelInfo {
                name: "mock-keyword".to_string(),
                dimension,
                max_sequence_length: usize::MAX,
            },
        }
    }

    fn score(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut values: Vec<f32> = self
            .groups
            .iter()
            .map(|group| group.iter().filter(|k| lowered.contains(k.as_str())).count() as f32)
            .collect();
        values.push(0.1);
        values
    }
}

impl EmbeddingModel for KeywordEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts.iter().map(|t| Embedding::new(self.score(t))).collect())
    }
}
