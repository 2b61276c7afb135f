//! Highlight policy
//!
//! Maps a cluster's membership flags and the active highlight mode to bubble
//! colors. Only comparison mode branches; every other mode paints all clusters
//! with the same muted accent.

use serde::{Deserialize, Serialize};
use topicmap_core::{HighlightMode, MembershipFlags};

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

// ============================================================================
// Palette
// ============================================================================

pub const COLOR_BACKGROUND: Color = Color::rgb(15, 23, 42);

// Uniform accent used by none/episode/notebook modes
pub const COLOR_ACCENT_FILL: Color = Color::rgba(99, 102, 241, 102);
pub const COLOR_ACCENT_STROKE: Color = Color::rgb(99, 102, 241);
pub const COLOR_ACCENT_TEXT: Color = Color::rgb(226, 232, 240);

// Comparison: covered by both the episode and the notebook
pub const COLOR_OVERLAP_FILL: Color = Color::rgba(34, 197, 94, 230);
pub const COLOR_OVERLAP_STROKE: Color = Color::rgb(22, 163, 74);
pub const COLOR_OVERLAP_TEXT: Color = Color::rgb(255, 255, 255);

// Comparison: new territory (episode only)
pub const COLOR_NEW_FILL: Color = Color::rgba(59, 130, 246, 153);
pub const COLOR_NEW_STROKE: Color = Color::rgb(37, 99, 235);
pub const COLOR_NEW_TEXT: Color = Color::rgb(255, 255, 255);

// Comparison: not touched by the episode
pub const COLOR_DIMMED_FILL: Color = Color::rgba(100, 116, 139, 64);
pub const COLOR_DIMMED_STROKE: Color = Color::rgba(100, 116, 139, 128);
pub const COLOR_DIMMED_TEXT: Color = Color::rgb(148, 163, 184);

pub const COLOR_HOVER_STROKE: Color = Color::rgb(255, 255, 255);
pub const COLOR_COUNT_TEXT: Color = Color::rgb(148, 163, 184);

pub const STROKE_WIDTH: f32 = 1.0;
pub const STROKE_WIDTH_HOVERED: f32 = 2.0;

/// Fill, outline and label colors for one bubble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubbleStyle {
    pub fill: Color,
    pub stroke: Color,
    pub text: Color,
    pub stroke_width: f32,
}

/// Which of the four visual classes a cluster falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightClass {
    Uniform,
    Overlap,
    NewTerritory,
    Dimmed,
}

impl HighlightClass {
    /// In comparison mode the episode axis decides first: a notebook-only
    /// cluster is dimmed like an untouched one. Missing flags count as
    /// "not in episode".
    pub fn classify(mode: HighlightMode, flags: Option<MembershipFlags>) -> Self {
        if mode != HighlightMode::Comparison {
            return HighlightClass::Uniform;
        }
        let flags = flags.unwrap_or_default();
        match (flags.in_episode, flags.in_notebook) {
            (true, true) => HighlightClass::Overlap,
            (true, false) => HighlightClass::NewTerritory,
            (false, _) => HighlightClass::Dimmed,
        }
    }

    pub fn base_style(&self) -> BubbleStyle {
        let (fill, stroke, text) = match self {
            HighlightClass::Uniform => (COLOR_ACCENT_FILL, COLOR_ACCENT_STROKE, COLOR_ACCENT_TEXT),
            HighlightClass::Overlap => {
                (COLOR_OVERLAP_FILL, COLOR_OVERLAP_STROKE, COLOR_OVERLAP_TEXT)
            }
            HighlightClass::NewTerritory => (COLOR_NEW_FILL, COLOR_NEW_STROKE, COLOR_NEW_TEXT),
            HighlightClass::Dimmed => (COLOR_DIMMED_FILL, COLOR_DIMMED_STROKE, COLOR_DIMMED_TEXT),
        };
        BubbleStyle {
            fill,
            stroke,
            text,
            stroke_width: STROKE_WIDTH,
        }
    }

    pub fn legend_label(&self) -> &'static str {
        match self {
            HighlightClass::Uniform => "Topic cluster",
            HighlightClass::Overlap => "Episode + notebook",
            HighlightClass::NewTerritory => "New territory",
            HighlightClass::Dimmed => "Not in episode",
        }
    }
}

/// Style for one bubble. Hover only swaps the outline; fill and text are untouched.
pub fn highlight_style(
    mode: HighlightMode,
    flags: Option<MembershipFlags>,
    hovered: bool,
) -> BubbleStyle {
    let mut style = HighlightClass::classify(mode, flags).base_style();
    if hovered {
        style.stroke = COLOR_HOVER_STROKE;
        style.stroke_width = STROKE_WIDTH_HOVERED;
    }
    style
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub style: BubbleStyle,
}

pub fn legend_entries(mode: HighlightMode) -> Vec<LegendEntry> {
    let classes: &[HighlightClass] = match mode {
        HighlightMode::Comparison => &[
            HighlightClass::Overlap,
            HighlightClass::NewTerritory,
            HighlightClass::Dimmed,
        ],
        _ => &[HighlightClass::Uniform],
    };
    classes
        .iter()
        .map(|class| LegendEntry {
            label: class.legend_label(),
            style: class.base_style(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_comparison_modes_are_uniform() {
        for mode in [
            HighlightMode::None,
            HighlightMode::Episode,
            HighlightMode::Notebook,
        ] {
            for flags in [
                None,
                Some(MembershipFlags::new(true, true)),
                Some(MembershipFlags::new(false, true)),
            ] {
                assert_eq!(
                    highlight_style(mode, flags, false),
                    HighlightClass::Uniform.base_style()
                );
            }
        }
    }

    #[test]
    fn test_comparison_classes() {
        let mode = HighlightMode::Comparison;
        assert_eq!(
            HighlightClass::classify(mode, Some(MembershipFlags::new(true, true))),
            HighlightClass::Overlap
        );
        assert_eq!(
            HighlightClass::classify(mode, Some(MembershipFlags::new(true, false))),
            HighlightClass::NewTerritory
        );
        assert_eq!(
            HighlightClass::classify(mode, Some(MembershipFlags::new(false, true))),
            HighlightClass::Dimmed
        );
        assert_eq!(
            HighlightClass::classify(mode, Some(MembershipFlags::new(false, false))),
            HighlightClass::Dimmed
        );
        assert_eq!(HighlightClass::classify(mode, None), HighlightClass::Dimmed);
    }

    #[test]
    fn test_overlap_is_most_opaque() {
        let overlap = HighlightClass::Overlap.base_style();
        let new = HighlightClass::NewTerritory.base_style();
        let dimmed = HighlightClass::Dimmed.base_style();
        assert!(overlap.fill.a > new.fill.a);
        assert!(new.fill.a > dimmed.fill.a);
    }

    #[test]
    fn test_hover_changes_stroke_only() {
        for mode in HighlightMode::ALL {
            let flags = Some(MembershipFlags::new(true, false));
            let idle = highlight_style(mode, flags, false);
            let hovered = highlight_style(mode, flags, true);
            assert_eq!(idle.fill, hovered.fill);
            assert_eq!(idle.text, hovered.text);
            assert_eq!(hovered.stroke, COLOR_HOVER_STROKE);
            assert_eq!(idle.stroke_width, 1.0);
            assert_eq!(hovered.stroke_width, 2.0);
        }
    }

    #[test]
    fn test_legend_entries() {
        assert_eq!(legend_entries(HighlightMode::None).len(), 1);
        let labels: Vec<&str> = legend_entries(HighlightMode::Comparison)
            .iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, vec!["Episode + notebook", "New territory", "Not in episode"]);
    }
}
