use crate::{ClusterId, EpisodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MembershipFlags {
    pub in_episode: bool,
    pub in_notebook: bool,
}

impl MembershipFlags {
    pub fn new(in_episode: bool, in_notebook: bool) -> Self {
        Self {
            in_episode,
            in_notebook,
        }
    }

    pub fn merge(self, other: MembershipFlags) -> Self {
        Self {
            in_episode: self.in_episode || other.in_episode,
            in_notebook: self.in_notebook || other.in_notebook,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMembership {
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub in_episode: bool,
    #[serde(default)]
    pub in_notebook: bool,
}

impl ClusterMembership {
    pub fn flags(&self) -> MembershipFlags {
        MembershipFlags::new(self.in_episode, self.in_notebook)
    }
}

/// Per-cluster membership of one episode against the user's notebook coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub episode_id: EpisodeId,
    #[serde(default)]
    pub memberships: Vec<ClusterMembership>,
}

impl ComparisonResult {
    pub fn new(episode_id: EpisodeId, memberships: Vec<ClusterMembership>) -> Self {
        Self {
            episode_id,
            memberships,
        }
    }

    /// Build a result from the two coverage sets. Episode clusters come first
    /// in their given order, followed by notebook-only clusters.
    pub fn from_coverage(
        episode_id: EpisodeId,
        episode_clusters: &[ClusterId],
        notebook_clusters: &[ClusterId],
    ) -> Self {
        let mut memberships: Vec<ClusterMembership> = Vec::new();
        for &cluster_id in episode_clusters {
            memberships.push(ClusterMembership {
                cluster_id,
                in_episode: true,
                in_notebook: notebook_clusters.contains(&cluster_id),
            });
        }
        for &cluster_id in notebook_clusters {
            if !episode_clusters.contains(&cluster_id) {
                memberships.push(ClusterMembership {
                    cluster_id,
                    in_episode: false,
                    in_notebook: true,
                });
            }
        }
        Self::new(episode_id, memberships)
    }

    /// Memberships with duplicate cluster ids folded together.
    ///
    /// Flags are OR-ed and the first occurrence keeps its position.
    pub fn merged(&self) -> Vec<ClusterMembership> {
        let mut index: HashMap<ClusterId, usize> = HashMap::new();
        let mut merged: Vec<ClusterMembership> = Vec::with_capacity(self.memberships.len());
        for membership in &self.memberships {
            match index.get(&membership.cluster_id) {
                Some(&i) => {
                    let flags = merged[i].flags().merge(membership.flags());
                    merged[i].in_episode = flags.in_episode;
                    merged[i].in_notebook = flags.in_notebook;
                }
                None => {
                    index.insert(membership.cluster_id, merged.len());
                    merged.push(*membership);
                }
            }
        }
        merged
    }
}

/// Membership flags attached to clusters for the lifetime of one comparison render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    flags: HashMap<ClusterId, MembershipFlags>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_comparison(result: &ComparisonResult) -> Self {
        let mut flags: HashMap<ClusterId, MembershipFlags> = HashMap::new();
        for membership in &result.memberships {
            flags
                .entry(membership.cluster_id)
                .and_modify(|f| *f = f.merge(membership.flags()))
                .or_insert_with(|| membership.flags());
        }
        Self { flags }
    }

    pub fn get(&self, id: ClusterId) -> Option<MembershipFlags> {
        self.flags.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
