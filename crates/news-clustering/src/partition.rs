//! Turning raw cluster labels into the groups reported to callers.
//!
//! Every reported group has a stable numeric id. Dense clusters keep their
//! HDBSCAN label; under [`NoisePolicy::Singleton`] each noise article gets an
//! id after the largest dense label, in input order.

use serde::{Deserialize, Serialize};

use crate::clusterer::{ClusterAssignment, Label};
use crate::config::NoisePolicy;

/// Origin of a partition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// A cluster found by HDBSCAN
    Dense,
    /// A single noise article
    Noise,
}

/// One reported group of articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionGroup {
    pub cluster_id: i64,
    /// Article indices in input order
    pub members: Vec<usize>,
    pub kind: GroupKind,
}

/// Ordered groups covering the clustered articles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<PartitionGroup>,
}

impl Partition {
    /// Build the partition for an assignment.
    ///
    /// Dense groups come first in label order, then noise singletons (if
    /// kept) in input order.
    pub fn build(assignment: &ClusterAssignment, policy: NoisePolicy) -> Self {
        let cluster_ids = assignment.cluster_ids();

        let mut groups: Vec<PartitionGroup> = cluster_ids
            .iter()
            .map(|&id| PartitionGroup {
                cluster_id: i64::from(id),
                members: assignment.members(Label::Cluster(id)),
                kind: GroupKind::Dense,
            })
            .collect();

        if policy == NoisePolicy::Singleton {
            let first_noise_id = cluster_ids.last().map_or(0, |&max| i64::from(max) + 1);
            groups.extend(assignment.noise_indices().into_iter().zip(first_noise_id..).map(
                |(index, cluster_id)| PartitionGroup {
                    cluster_id,
                    members: vec![index],
                    kind: GroupKind::Noise,
                },
            ));
        }

        Self { groups }
    }

    pub fn groups(&self) -> &[PartitionGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<PartitionGroup> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn dense_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.kind == GroupKind::Dense)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(cluster_id: i64, members: Vec<usize>, kind: GroupKind) -> PartitionGroup {
        PartitionGroup {
            cluster_id,
            members,
            kind,
        }
    }

    #[test]
    fn test_singleton_noise_numbered_after_max_label() {
        let assignment = ClusterAssignment::from_raw(&[1, -1, 0, 1, -1, 0]);
        let partition = Partition::build(&assignment, NoisePolicy::Singleton);

        assert_eq!(
            partition.groups(),
            &[
                group(0, vec![2, 5], GroupKind::Dense),
                group(1, vec![0, 3], GroupKind::Dense),
                group(2, vec![1], GroupKind::Noise),
                group(3, vec![4], GroupKind::Noise),
            ]
        );
        assert_eq!(partition.dense_count(), 2);
    }

    #[test]
    fn test_drop_policy_omits_noise() {
        let assignment = ClusterAssignment::from_raw(&[0, -1, 0]);
        let partition = Partition::build(&assignment, NoisePolicy::Drop);
        assert_eq!(partition.groups(), &[group(0, vec![0, 2], GroupKind::Dense)]);
    }

    #[test]
    fn test_all_noise_numbered_from_zero() {
        let partition = Partition::build(&ClusterAssignment::all_noise(3), NoisePolicy::Singleton);
        let ids: Vec<i64> = partition.groups().iter().map(|g| g.cluster_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(partition.dense_count(), 0);
    }

    #[test]
    fn test_all_noise_dropped_is_empty() {
        let partition = Partition::build(&ClusterAssignment::all_noise(2), NoisePolicy::Drop);
        assert!(partition.is_empty());
    }

    #[test]
    fn test_singleton_covers_every_article_once() {
        let assignment = ClusterAssignment::from_raw(&[2, -1, 2, 0, -1, 0, 2]);
        let partition = Partition::build(&assignment, NoisePolicy::Singleton);

        let mut seen: Vec<usize> = partition
            .groups()
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());

        // Label 1 is unused, so noise starts after the largest label.
        let noise_ids: Vec<i64> = partition
            .groups()
            .iter()
            .filter(|g| g.kind == GroupKind::Noise)
            .map(|g| g.cluster_id)
            .collect();
        assert_eq!(noise_ids, vec![3, 4]);
    }

    #[test]
    fn test_empty_assignment() {
        let partition = Partition::build(&ClusterAssignment::default(), NoisePolicy::Singleton);
        assert!(partition.is_empty());
    }
}
