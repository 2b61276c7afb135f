//! Episode vs. notebook coverage summary.

use serde::Serialize;
use topicmap_core::{ClusterId, ClusterSnapshot, ComparisonResult, EpisodeId};

/// Number of new-territory clusters listed before collapsing into "+N more".
pub const NEW_TERRITORY_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub episode_id: EpisodeId,
    /// Clusters covered by both the episode and the notebook, provider order.
    pub overlapping: Vec<ClusterId>,
    /// Clusters in the episode but not the notebook, provider order.
    pub new_clusters: Vec<ClusterId>,
    pub new_territory_count: usize,
    pub overlap_count: usize,
    pub episode_cluster_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTerritoryPreview<'a> {
    pub shown: &'a [ClusterId],
    /// Residual for the "+N more" line.
    pub remaining: usize,
}

impl ComparisonSummary {
    pub fn from_result(result: &ComparisonResult) -> Self {
        let memberships = result.merged();
        let mut overlapping = Vec::new();
        let mut new_clusters = Vec::new();
        let mut episode_cluster_count = 0;

        for membership in &memberships {
            if !membership.in_episode {
                continue;
            }
            episode_cluster_count += 1;
            if membership.in_notebook {
                overlapping.push(membership.cluster_id);
            } else {
                new_clusters.push(membership.cluster_id);
            }
        }

        Self {
            episode_id: result.episode_id.clone(),
            new_territory_count: new_clusters.len(),
            overlap_count: overlapping.len(),
            overlapping,
            new_clusters,
            episode_cluster_count,
        }
    }

    /// An episode that touches no clusters: nothing to display.
    pub fn is_empty(&self) -> bool {
        self.episode_cluster_count == 0
    }

    pub fn new_territory_preview(&self, limit: usize) -> NewTerritoryPreview<'_> {
        let end = self.new_clusters.len().min(limit);
        NewTerritoryPreview {
            shown: &self.new_clusters[..end],
            remaining: self.new_clusters.len() - end,
        }
    }

    /// Labels of the previewed new-territory clusters. Ids the snapshot does
    /// not know are shown as `cluster <id>` so the list always matches the
    /// "+N more" residual.
    pub fn preview_labels(&self, snapshot: Option<&ClusterSnapshot>, limit: usize) -> Vec<String> {
        self.new_territory_preview(limit)
            .shown
            .iter()
            .map(|id| match snapshot.and_then(|snapshot| snapshot.get(*id)) {
                Some(cluster) => cluster.label.clone(),
                None => format!("cluster {id}"),
            })
            .collect()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use topicmap_core::ClusterMembership;

    proptest! {
        /// Overlap and new territory partition the episode's clusters.
        #[test]
        fn prop_aggregates_bounded(
            raw in prop::collection::vec((0i64..30, any::<bool>(), any::<bool>()), 0..60)
        ) {
            let memberships = raw
                .iter()
                .map(|(id, in_episode, in_notebook)| ClusterMembership {
                    cluster_id: ClusterId(*id),
                    in_episode: *in_episode,
                    in_notebook: *in_notebook,
                })
                .collect();
            let result = ComparisonResult::new(EpisodeId::new("ep"), memberships);
            let summary = ComparisonSummary::from_result(&result);
            prop_assert!(summary.overlap_count + summary.new_territory_count <= summary.episode_cluster_count);
            prop_assert_eq!(summary.overlap_count + summary.new_territory_count, summary.episode_cluster_count);
            prop_assert_eq!(summary.is_empty(), summary.episode_cluster_count == 0);
        }
    }
}
