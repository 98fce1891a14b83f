//! HDBSCAN density clustering over article embeddings.

use std::collections::BTreeSet;

use hdbscan::{DistanceMetric, Hdbscan, HdbscanHyperParams, NnAlgorithm};
use tracing::{debug, info};

use crate::config::{ClusteringConfig, Metric};
use crate::error::ClusteringError;
use crate::similarity::normalize_rows;

/// Cluster label of one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Cluster(u32),
    Noise,
}

impl Label {
    /// Map a raw HDBSCAN label (-1 = noise).
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw).map_or(Label::Noise, Label::Cluster)
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, Label::Noise)
    }
}

/// Per-article labels, indexed like the input embeddings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<Label>,
}

impl ClusterAssignment {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn from_raw(raw: &[i32]) -> Self {
        Self::new(raw.iter().copied().map(Label::from_raw).collect())
    }

    /// Every article labelled noise.
    pub fn all_noise(len: usize) -> Self {
        Self::new(vec![Label::Noise; len])
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn label(&self, index: usize) -> Option<Label> {
        self.labels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Distinct non-noise labels in ascending order.
    pub fn cluster_ids(&self) -> Vec<u32> {
        self.labels
            .iter()
            .filter_map(|l| match l {
                Label::Cluster(id) => Some(*id),
                Label::Noise => None,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_ids().len()
    }

    /// Article indices carrying `label`, ascending.
    pub fn members(&self, label: Label) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn noise_indices(&self) -> Vec<usize> {
        self.members(Label::Noise)
    }
}

/// Density clusterer wrapping the `hdbscan` crate.
#[derive(Debug, Clone)]
pub struct DensityClusterer {
    config: ClusteringConfig,
}

impl DensityClusterer {
    pub fn new(config: ClusteringConfig) -> Result<Self, ClusteringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Label every embedding with a cluster or noise.
    pub fn cluster(&self, embeddings: &[Vec<f32>]) -> Result<ClusterAssignment, ClusteringError> {
        if embeddings.is_empty() {
            return Ok(ClusterAssignment::default());
        }

        check_rows(embeddings)?;

        if embeddings.len() < self.config.min_cluster_size {
            debug!(
                count = embeddings.len(),
                min_cluster_size = self.config.min_cluster_size,
                "Too few articles to form a cluster"
            );
            return Ok(ClusterAssignment::all_noise(embeddings.len()));
        }

        let rows = match self.config.metric {
            Metric::Cosine => normalize_rows(embeddings),
            Metric::Euclidean => embeddings.to_vec(),
        };

        let params = HdbscanHyperParams::builder()
            .min_cluster_size(self.config.min_cluster_size)
            .min_samples(self.config.min_samples)
            .epsilon(self.config.cluster_selection_epsilon)
            .allow_single_cluster(self.config.allow_single_cluster)
            .dist_metric(DistanceMetric::Euclidean)
            .nn_algorithm(NnAlgorithm::BruteForce)
            .build();

        let raw = Hdbscan::new(&rows, params)
            .cluster()
            .map_err(|e| ClusteringError::Clustering(e.to_string()))?;

        let assignment = ClusterAssignment::from_raw(&raw);
        info!(
            articles = assignment.len(),
            clusters = assignment.cluster_count(),
            noise = assignment.noise_indices().len(),
            "Clustering complete"
        );

        Ok(assignment)
    }
}

fn check_rows(embeddings: &[Vec<f32>]) -> Result<(), ClusteringError> {
    let expected = embeddings[0].len();
    if expected == 0 {
        return Err(ClusteringError::Clustering(
            "embeddings have no dimensions".to_string(),
        ));
    }

    for (row, values) in embeddings.iter().enumerate() {
        if values.len() != expected {
            return Err(ClusteringError::DimensionMismatch {
                expected,
                actual: values.len(),
                row,
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ClusteringError::NonFinite(row));
        }
    }

    Ok(())
}
