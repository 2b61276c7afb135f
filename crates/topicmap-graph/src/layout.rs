//! Bubble layout: normalized cluster positions and sizes to pixel geometry.

use crate::geometry::{Circle, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use topicmap_core::{Cluster, ClusterId, ClusterSnapshot, NormalizedPos};

/// Logical drawing area in pixels (before device pixel ratio scaling).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Negative or non-finite dimensions collapse to zero.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_dim(width),
            height: sanitize_dim(height),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

fn sanitize_dim(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedCluster {
    pub id: ClusterId,
    pub circle: Circle,
}

/// Geometry for every cluster of one snapshot at one viewport, in snapshot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterLayout {
    pub snapshot_revision: u64,
    pub viewport: Viewport,
    pub bubbles: Vec<PlacedCluster>,
}

impl ClusterLayout {
    pub fn get(&self, id: ClusterId) -> Option<&PlacedCluster> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}

pub struct BubbleLayouter {
    /// Edge padding kept free of bubble centres.
    pub padding: f32,
    pub min_radius: f32,
    /// Radius added on top of `min_radius` for the largest cluster.
    pub radius_span: f32,
}

impl Default for BubbleLayouter {
    fn default() -> Self {
        Self {
            padding: Self::DEFAULT_PADDING,
            min_radius: Self::MIN_RADIUS,
            radius_span: Self::RADIUS_SPAN,
        }
    }
}

impl BubbleLayouter {
    pub const DEFAULT_PADDING: f32 = 50.0;
    pub const MIN_RADIUS: f32 = 15.0;
    pub const RADIUS_SPAN: f32 = 45.0;

    /// Linear map from `[0,1]²` into the padded drawing area.
    ///
    /// Positions are clamped first. When a dimension is smaller than twice the
    /// padding the padding shrinks to half that dimension, so a centre never
    /// leaves `[0, dim]`.
    pub fn center(&self, position: NormalizedPos, viewport: Viewport) -> Vec2 {
        let pos = position.clamped();
        Vec2::new(
            map_axis(pos.x, viewport.width, self.padding),
            map_axis(pos.y, viewport.height, self.padding),
        )
    }

    /// `min_radius + (size / max_size) * radius_span`, with `max_size` floored at 1.
    pub fn radius(&self, size: u64, max_size: u64) -> f32 {
        let max_size = max_size.max(1);
        let ratio = (size.min(max_size) as f64 / max_size as f64) as f32;
        self.min_radius + ratio * self.radius_span
    }

    pub fn place(&self, cluster: &Cluster, max_size: u64, viewport: Viewport) -> Circle {
        Circle::new(
            self.center(cluster.position, viewport),
            self.radius(cluster.effective_size(), max_size),
        )
    }

    pub fn layout(&self, snapshot: &ClusterSnapshot, viewport: Viewport) -> ClusterLayout {
        let max_size = snapshot.max_size();
        let bubbles = snapshot
            .clusters()
            .iter()
            .map(|cluster| PlacedCluster {
                id: cluster.id,
                circle: self.place(cluster, max_size, viewport),
            })
            .collect();

        ClusterLayout {
            snapshot_revision: snapshot.revision(),
            viewport,
            bubbles,
        }
    }
}

fn map_axis(norm: f32, dim: f32, padding: f32) -> f32 {
    let pad = padding.min(dim * 0.5).max(0.0);
    pad + norm * (dim - 2.0 * pad)
}

/// Memoizes the last layout by `(snapshot revision, viewport)`.
pub struct LayoutCache {
    layouter: BubbleLayouter,
    cached: Option<Arc<ClusterLayout>>,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(BubbleLayouter::default())
    }
}

impl LayoutCache {
    pub fn new(layouter: BubbleLayouter) -> Self {
        Self {
            layouter,
            cached: None,
        }
    }

    pub fn get_or_compute(
        &mut self,
        snapshot: &ClusterSnapshot,
        viewport: Viewport,
    ) -> Arc<ClusterLayout> {
        if let Some(cached) = &self.cached {
            if cached.snapshot_revision == snapshot.revision() && cached.viewport == viewport {
                return Arc::clone(cached);
            }
        }

        tracing::debug!(
            "Recomputing layout for revision {} at {}x{}",
            snapshot.revision(),
            viewport.width,
            viewport.height
        );
        let layout = Arc::new(self.layouter.layout(snapshot, viewport));
        self.cached = Some(Arc::clone(&layout));
        layout
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn cluster_strategy() -> impl Strategy<Value = (f32, f32, i64)> {
        (-0.5f32..1.5, -0.5f32..1.5, -20i64..10_000)
    }

    proptest! {
        /// Every radius stays within `[15, 60]` whatever the absolute sizes.
        #[test]
        fn prop_radius_bounded(specs in prop::collection::vec(cluster_strategy(), 1..40)) {
            let clusters = specs
                .iter()
                .enumerate()
                .map(|(i, (x, y, size))| Cluster::new(i as i64, "c", NormalizedPos::new(*x, *y), *size))
                .collect();
            let snapshot = ClusterSnapshot::new(clusters).unwrap();
            let layout = BubbleLayouter::default().layout(&snapshot, Viewport::new(640.0, 480.0));
            for bubble in &layout.bubbles {
                prop_assert!(bubble.circle.radius >= 15.0 && bubble.circle.radius <= 60.0);
            }
        }

        /// Radius is non-decreasing in size for a fixed snapshot maximum.
        #[test]
        fn prop_radius_monotonic(a in 0u64..5_000, b in 0u64..5_000, max in 1u64..5_000) {
            let layouter = BubbleLayouter::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo = lo.min(max);
            let hi = hi.min(max);
            prop_assert!(layouter.radius(lo, max) <= layouter.radius(hi, max));
        }

        /// Centres lie within `[P, dim - P]` on both axes.
        #[test]
        fn prop_center_within_padding(
            x in -1.0f32..2.0,
            y in -1.0f32..2.0,
            width in 100.0f32..2000.0,
            height in 100.0f32..2000.0,
        ) {
            let layouter = BubbleLayouter::default();
            let c = layouter.center(NormalizedPos::new(x, y), Viewport::new(width, height));
            let p = BubbleLayouter::DEFAULT_PADDING;
            prop_assert!(c.x >= p - 1e-3 && c.x <= width - p + 1e-3);
            prop_assert!(c.y >= p - 1e-3 && c.y <= height - p + 1e-3);
        }
    }
}
