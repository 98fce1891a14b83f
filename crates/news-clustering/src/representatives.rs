//! Representative article selection.
//!
//! The summarizer only sees a handful of articles per cluster: the members
//! closest (by cosine similarity) to the cluster's mean embedding.

use std::cmp::Ordering;

use crate::clusterer::{ClusterAssignment, Label};
use crate::similarity::{cosine_similarity, mean_centroid};

/// Chosen representatives of one dense cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRepresentatives {
    pub cluster_id: u32,
    /// Article indices, most central first
    pub members: Vec<usize>,
}

/// Pick up to `n` representatives per dense cluster.
///
/// Clusters are returned in ascending label order. Within a cluster,
/// members are ranked by descending similarity to the centroid with ties
/// going to the lower article index.
pub fn select_representatives(
    embeddings: &[Vec<f32>],
    assignment: &ClusterAssignment,
    n: usize,
) -> Vec<ClusterRepresentatives> {
    assignment
        .cluster_ids()
        .into_iter()
        .map(|cluster_id| ClusterRepresentatives {
            cluster_id,
            members: rank_members(embeddings, &assignment.members(Label::Cluster(cluster_id)), n),
        })
        .collect()
}

/// Up to `n` of `members`, most central first.
pub fn rank_members(embeddings: &[Vec<f32>], members: &[usize], n: usize) -> Vec<usize> {
    let vectors: Vec<&[f32]> = members
        .iter()
        .filter_map(|&i| embeddings.get(i).map(|v| v.as_slice()))
        .collect();
    let centroid = mean_centroid(&vectors);

    let mut scored: Vec<(usize, f32)> = members
        .iter()
        .filter_map(|&i| {
            embeddings
                .get(i)
                .map(|v| (i, cosine_similarity(v, &centroid)))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    scored.into_iter().take(n).map(|(i, _)| i).collect()
}
