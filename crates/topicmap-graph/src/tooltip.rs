use crate::geometry::Vec2;
use serde::Serialize;
use topicmap_core::Cluster;

/// Gap between the cursor and the tooltip's top-left corner.
pub const TOOLTIP_OFFSET: Vec2 = Vec2 { x: 12.0, y: 12.0 };

/// Top-left corner for a tooltip near `cursor`, kept inside `bounds`.
///
/// Per axis: `min(cursor + offset, bound - size)`, floored at 0 for tooltips
/// larger than the viewport.
pub fn place_tooltip(cursor: Vec2, tooltip_size: Vec2, bounds: Vec2, offset: Vec2) -> Vec2 {
    Vec2::new(
        (cursor.x + offset.x).min(bounds.x - tooltip_size.x).max(0.0),
        (cursor.y + offset.y).min(bounds.y - tooltip_size.y).max(0.0),
    )
}

/// What the hover tooltip shows for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipContent {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub size: u64,
    pub primary_count: u64,
}

impl TooltipContent {
    pub fn for_cluster(cluster: &Cluster) -> Self {
        Self {
            title: cluster.label.clone(),
            description: cluster.description.clone(),
            keywords: cluster.display_keywords().to_vec(),
            size: cluster.effective_size(),
            primary_count: cluster.primary_count.max(0) as u64,
        }
    }

    pub fn stats_line(&self) -> String {
        format!("{} papers · {} primary", self.size, self.primary_count)
    }
}
