use crate::{EpisodeId, HighlightMode};
use serde::{Deserialize, Serialize};

/// Host-supplied configuration of one map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub highlight_mode: HighlightMode,
    pub episode_id: Option<EpisodeId>,
    /// Logical width in pixels.
    pub width: f32,
    /// Logical height in pixels.
    pub height: f32,
    pub show_legend: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            highlight_mode: HighlightMode::None,
            episode_id: None,
            width: 800.0,
            height: 600.0,
            show_legend: false,
        }
    }
}

impl MapConfig {
    /// A comparison is only fetched in comparison mode with an episode selected.
    pub fn wants_comparison(&self) -> bool {
        self.highlight_mode == HighlightMode::Comparison && self.episode_id.is_some()
    }

    /// Whether switching from `self` to `next` requires a fresh load.
    pub fn requires_reload(&self, next: &MapConfig) -> bool {
        self.highlight_mode != next.highlight_mode || self.episode_id != next.episode_id
    }
}
