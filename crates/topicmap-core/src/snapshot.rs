use crate::{Cluster, ClusterId, CoreError};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// One fetched, immutable copy of the full cluster set.
///
/// Snapshots are replaced wholesale on reload; every snapshot gets a fresh
/// revision so geometry derived from an older one can never be mistaken for
/// current data.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSnapshot {
    revision: u64,
    clusters: Vec<Cluster>,
}

impl ClusterSnapshot {
    pub fn new(clusters: Vec<Cluster>) -> Result<Self, CoreError> {
        let mut seen = HashSet::with_capacity(clusters.len());
        for cluster in &clusters {
            if !seen.insert(cluster.id) {
                return Err(CoreError::DuplicateClusterId(cluster.id));
            }
        }

        let out_of_bounds = clusters
            .iter()
            .filter(|c| !c.position.is_in_bounds() || c.size < 0)
            .count();
        if out_of_bounds > 0 {
            tracing::warn!(
                "{} cluster(s) carry out-of-range position or size; geometry will be clamped",
                out_of_bounds
            );
        }

        Ok(Self {
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
            clusters,
        })
    }

    pub fn empty() -> Self {
        Self {
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
            clusters: Vec::new(),
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    /// Largest effective size in the snapshot, floored at 1 so it is always a safe divisor.
    pub fn max_size(&self) -> u64 {
        self.clusters
            .iter()
            .map(Cluster::effective_size)
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NormalizedPos;

    fn cluster(id: i64, size: i64) -> Cluster {
        Cluster::new(id, format!("c{id}"), NormalizedPos::new(0.5, 0.5), size)
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = ClusterSnapshot::new(vec![cluster(1, 1), cluster(1, 2)]).unwrap_err();
        assert_eq!(err, CoreError::DuplicateClusterId(ClusterId(1)));
    }

    #[test]
    fn test_max_size_floor() {
        let snapshot = ClusterSnapshot::new(vec![cluster(1, 0), cluster(2, -3)]).unwrap();
        assert_eq!(snapshot.max_size(), 1);
        assert_eq!(ClusterSnapshot::empty().max_size(), 1);

        let snapshot = ClusterSnapshot::new(vec![cluster(1, 4), cluster(2, 9)]).unwrap();
        assert_eq!(snapshot.max_size(), 9);
    }

    #[test]
    fn test_revisions_are_unique() {
        let a = ClusterSnapshot::new(vec![cluster(1, 1)]).unwrap();
        let b = ClusterSnapshot::new(vec![cluster(1, 1)]).unwrap();
        assert_ne!(a.revision(), b.revision());
    }

    #[test]
    fn test_order_preserved() {
        let snapshot = ClusterSnapshot::new(vec![cluster(3, 1), cluster(1, 1), cluster(2, 1)])
            .unwrap();
        let ids: Vec<i64> = snapshot.clusters().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(snapshot.get(ClusterId(1)).map(|c| c.label.as_str()), Some("c1"));
    }
}
