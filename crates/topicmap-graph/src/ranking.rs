//! Ranked bar chart data, independent of the bubble canvas.

use serde::{Deserialize, Serialize};
use topicmap_core::{ClusterId, ClusterSnapshot};

pub const DEFAULT_MAX_BARS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub cluster_id: ClusterId,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBar {
    pub cluster_id: ClusterId,
    pub label: String,
    pub count: u64,
    /// `count` relative to the top bar, in `[0,1]`.
    pub fraction: f32,
}

/// Sort descending by count and keep the first `max_bars`. Ties keep input order.
pub fn rank_bars(items: &[RankedItem], max_bars: usize) -> Vec<RankedBar> {
    let mut sorted: Vec<&RankedItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.count.cmp(&a.count));
    sorted.truncate(max_bars);

    let top = sorted.first().map(|item| item.count).unwrap_or(0);
    sorted
        .into_iter()
        .map(|item| RankedBar {
            cluster_id: item.cluster_id,
            label: item.label.clone(),
            count: item.count,
            fraction: if top == 0 {
                0.0
            } else {
                item.count as f32 / top as f32
            },
        })
        .collect()
}

/// One ranked item per cluster, counted by effective size.
pub fn items_from_snapshot(snapshot: &ClusterSnapshot) -> Vec<RankedItem> {
    snapshot
        .clusters()
        .iter()
        .map(|cluster| RankedItem {
            cluster_id: cluster.id,
            label: cluster.label.clone(),
            count: cluster.effective_size(),
        })
        .collect()
}
