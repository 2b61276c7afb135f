use crate::geometry::Vec2;
use crate::layout::{ClusterLayout, PlacedCluster};
use topicmap_core::ClusterId;

/// Hit tester for the cluster bubble map.
///
/// Holds the same geometry the renderer drew and answers "which cluster is
/// here?". A point hits a bubble when its distance to the centre is `<= r`.
///
/// Tie-break: bubbles are scanned in snapshot order and the first hit wins, so
/// overlapping bubbles resolve to the earlier cluster, not the one drawn on top
/// and not the smaller one.
#[derive(Debug, Clone, Default)]
pub struct HitTester {
    bubbles: Vec<PlacedCluster>,
}

impl HitTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layout(layout: &ClusterLayout) -> Self {
        let mut tester = Self::new();
        tester.update(layout);
        tester
    }

    /// Refresh hit regions. Call this after any layout change.
    pub fn update(&mut self, layout: &ClusterLayout) {
        self.bubbles.clear();
        self.bubbles.extend_from_slice(&layout.bubbles);
    }

    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    pub fn hit_test(&self, pos: Vec2) -> Option<ClusterId> {
        self.bubbles
            .iter()
            .find(|bubble| bubble.circle.contains(pos))
            .map(|bubble| bubble.id)
    }

    /// Every cluster under `pos`, in snapshot order.
    pub fn hit_test_all(&self, pos: Vec2) -> Vec<ClusterId> {
        self.bubbles
            .iter()
            .filter(|bubble| bubble.circle.contains(pos))
            .map(|bubble| bubble.id)
            .collect()
    }

    pub fn bubbles(&self) -> &[PlacedCluster] {
        &self.bubbles
    }
}
