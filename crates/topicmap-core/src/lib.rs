use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod config;
pub mod error;
pub mod membership;
pub mod snapshot;

pub use config::MapConfig;
pub use error::CoreError;
pub use membership::{Annotations, ClusterMembership, ComparisonResult, MembershipFlags};
pub use snapshot::ClusterSnapshot;

/// Number of keywords shown wherever a cluster's keywords are displayed.
pub const DISPLAY_KEYWORD_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(pub i64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layout coordinates in `[0,1]²`, origin top-left, independent of any viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPos {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[0,1]`. Non-finite components land on the centre line.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }

    pub fn is_in_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 }
}

/// One topic group as delivered by the cluster provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub position: NormalizedPos,
    /// Member count driving the bubble radius. Negative values are treated as zero.
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub primary_count: i64,
}

impl Cluster {
    pub fn new(id: i64, label: impl Into<String>, position: NormalizedPos, size: i64) -> Self {
        Self {
            id: ClusterId(id),
            label: label.into(),
            description: String::new(),
            keywords: Vec::new(),
            position,
            size,
            primary_count: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_primary_count(mut self, primary_count: i64) -> Self {
        self.primary_count = primary_count;
        self
    }

    /// Size floored at zero.
    pub fn effective_size(&self) -> u64 {
        self.size.max(0) as u64
    }

    pub fn display_keywords(&self) -> &[String] {
        let end = self.keywords.len().min(DISPLAY_KEYWORD_LIMIT);
        &self.keywords[..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    #[default]
    None,
    Episode,
    Notebook,
    Comparison,
}

impl HighlightMode {
    pub const ALL: [HighlightMode; 4] = [
        HighlightMode::None,
        HighlightMode::Episode,
        HighlightMode::Notebook,
        HighlightMode::Comparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightMode::None => "none",
            HighlightMode::Episode => "episode",
            HighlightMode::Notebook => "notebook",
            HighlightMode::Comparison => "comparison",
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(HighlightMode::None),
            "episode" => Ok(HighlightMode::Episode),
            "notebook" => Ok(HighlightMode::Notebook),
            "comparison" => Ok(HighlightMode::Comparison),
            other => Err(CoreError::InvalidHighlightMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_position() {
        let pos = NormalizedPos::new(-0.5, 1.7).clamped();
        assert_eq!(pos, NormalizedPos::new(0.0, 1.0));

        let pos = NormalizedPos::new(f32::NAN, f32::INFINITY).clamped();
        assert_eq!(pos, NormalizedPos::new(0.5, 0.5));
    }

    #[test]
    fn test_effective_size_floors_negative() {
        let cluster = Cluster::new(1, "a", NormalizedPos::default(), -4);
        assert_eq!(cluster.effective_size(), 0);
    }

    #[test]
    fn test_display_keywords_truncated() {
        let cluster = Cluster::new(1, "a", NormalizedPos::default(), 1)
            .with_keywords(["k1", "k2", "k3", "k4", "k5", "k6"]);
        assert_eq!(cluster.display_keywords(), ["k1", "k2", "k3", "k4"]);

        let short = Cluster::new(2, "b", NormalizedPos::default(), 1).with_keywords(["only"]);
        assert_eq!(short.display_keywords(), ["only"]);
    }

    #[test]
    fn test_highlight_mode_parse() {
        assert_eq!(
            "Comparison".parse::<HighlightMode>().unwrap(),
            HighlightMode::Comparison
        );
        assert!("bogus".parse::<HighlightMode>().is_err());
        for mode in HighlightMode::ALL {
            assert_eq!(mode.as_str().parse::<HighlightMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_cluster_deserialize_defaults() {
        let json = r#"{"id": 7, "label": "Proteins", "position": {"x": 0.2, "y": 0.4}}"#;
        let cluster: Cluster = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.id, ClusterId(7));
        assert_eq!(cluster.size, 0);
        assert!(cluster.keywords.is_empty());
    }
}
