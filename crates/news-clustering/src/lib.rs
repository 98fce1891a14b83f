//! # news-clustering
//!
//! Groups article embeddings into topics.
//!
//! ## Pipeline
//! - [`DensityClusterer`] labels each embedding with an HDBSCAN cluster or noise
//! - [`select_representatives`] picks the members closest to each cluster centroid
//! - [`Partition`] turns labels into the numbered groups callers report,
//!   keeping or dropping noise according to [`NoisePolicy`]

pub mod clusterer;
pub mod config;
pub mod error;
pub mod partition;
pub mod representatives;
pub mod similarity;

pub use clusterer::{ClusterAssignment, DensityClusterer, Label};
pub use config::{ClusteringConfig, Metric, NoisePolicy};
pub use error::ClusteringError;
pub use partition::{GroupKind, Partition, PartitionGroup};
pub use representatives::{rank_members, select_representatives, ClusterRepresentatives};
pub use similarity::{cosine_similarity, mean_centroid, normalize, normalize_rows};
