//! Clustering configuration.

use serde::{Deserialize, Serialize};

use news_types::{ClusteringSettings, DistanceMetricSetting, NoisePolicySetting};

use crate::error::ClusteringError;

/// Distance the clusterer works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Metric {
    /// Rows are L2-normalized before Euclidean HDBSCAN
    #[default]
    Cosine,
    Euclidean,
}

impl From<DistanceMetricSetting> for Metric {
    fn from(setting: DistanceMetricSetting) -> Self {
        match setting {
            DistanceMetricSetting::Cosine => Metric::Cosine,
            DistanceMetricSetting::Euclidean => Metric::Euclidean,
        }
    }
}

/// How noise articles are represented in the final partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NoisePolicy {
    /// One group per noise article
    #[default]
    Singleton,
    /// Noise articles are omitted
    Drop,
}

impl From<NoisePolicySetting> for NoisePolicy {
    fn from(setting: NoisePolicySetting) -> Self {
        match setting {
            NoisePolicySetting::Singleton => NoisePolicy::Singleton,
            NoisePolicySetting::Drop => NoisePolicy::Drop,
        }
    }
}

/// Parameters for [`DensityClusterer`](crate::DensityClusterer) and the
/// steps that follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    pub min_cluster_size: usize,
    pub min_samples: usize,
    pub metric: Metric,
    pub cluster_selection_epsilon: f64,
    pub allow_single_cluster: bool,
    pub representatives: usize,
    pub noise_policy: NoisePolicy,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self::from(&ClusteringSettings::default())
    }
}

impl From<&ClusteringSettings> for ClusteringConfig {
    fn from(settings: &ClusteringSettings) -> Self {
        Self {
            min_cluster_size: settings.min_cluster_size,
            min_samples: settings.min_samples,
            metric: settings.metric.into(),
            cluster_selection_epsilon: settings.cluster_selection_epsilon,
            allow_single_cluster: settings.allow_single_cluster,
            representatives: settings.representatives,
            noise_policy: settings.noise_policy.into(),
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<(), ClusteringError> {
        if self.min_cluster_size < 2 {
            return Err(ClusteringError::InvalidConfig(
                "min_cluster_size must be at least 2".to_string(),
            ));
        }
        if self.min_samples == 0 {
            return Err(ClusteringError::InvalidConfig(
                "min_samples must be at least 1".to_string(),
            ));
        }
        if !self.cluster_selection_epsilon.is_finite() || self.cluster_selection_epsilon < 0.0 {
            return Err(ClusteringError::InvalidConfig(
                "cluster_selection_epsilon must be a non-negative number".to_string(),
            ));
        }
        if self.representatives == 0 {
            return Err(ClusteringError::InvalidConfig(
                "representatives must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
