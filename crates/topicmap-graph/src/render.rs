//! Frame construction for the bubble map.
//!
//! `render` is the single entry point of the geometry → style → draw
//! pipeline. It returns a display list in logical pixels; surfaces replay the
//! list and apply the device pixel ratio themselves.

use crate::geometry::{Rect, Vec2};
use crate::layout::{BubbleLayouter, ClusterLayout};
use crate::style::{self, BubbleStyle, Color, legend_entries};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use topicmap_core::{Annotations, ClusterId, ClusterSnapshot, HighlightMode};

/// Labels are drawn only on bubbles strictly larger than this radius.
pub const LABEL_MIN_RADIUS: f32 = 20.0;
pub const LABEL_MAX_FONT_SIZE: f32 = 11.0;
pub const COUNT_FONT_SIZE: f32 = 9.0;
/// Distance from the bubble rim to the member count baseline centre.
pub const COUNT_OFFSET: f32 = 12.0;
pub const LEGEND_FONT_SIZE: f32 = 10.0;
const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    Monospace,
    Proportional,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: f32,
    pub family: FontFamily,
}

impl FontSpec {
    pub fn monospace(size: f32) -> Self {
        Self {
            size,
            family: FontFamily::Monospace,
        }
    }

    pub fn proportional(size: f32) -> Self {
        Self {
            size,
            family: FontFamily::Proportional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    /// `pos` is the centre of the text box.
    Center,
    /// `pos` is the left edge, vertically centred.
    LeftCenter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
        stroke: Color,
        stroke_width: f32,
    },
    Rect {
        rect: Rect,
        fill: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        font: FontSpec,
        color: Color,
        align: TextAlign,
    },
}

/// Drawing target. Coordinates passed in are logical pixels.
pub trait Surface {
    /// Called once before any command. Implementations size their backing
    /// store as `logical_size * pixels_per_point` and scale accordingly.
    fn begin_frame(&mut self, logical_size: Vec2, pixels_per_point: f32);
    fn clear(&mut self, color: Color);
    fn circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color, stroke_width: f32);
    fn rect(&mut self, rect: Rect, fill: Color);
    fn text(&mut self, pos: Vec2, text: &str, font: FontSpec, color: Color, align: TextAlign);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub logical_size: Vec2,
    pub pixels_per_point: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Backing store size in physical pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        let ppp = sanitize_ppp(self.pixels_per_point);
        (
            (self.logical_size.x * ppp).round().max(0.0) as u32,
            (self.logical_size.y * ppp).round().max(0.0) as u32,
        )
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.begin_frame(self.logical_size, sanitize_ppp(self.pixels_per_point));
        for command in &self.commands {
            match command {
                DrawCommand::Clear { color } => surface.clear(*color),
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                    stroke_width,
                } => surface.circle(*center, *radius, *fill, *stroke, *stroke_width),
                DrawCommand::Rect { rect, fill } => surface.rect(*rect, *fill),
                DrawCommand::Text {
                    pos,
                    text,
                    font,
                    color,
                    align,
                } => surface.text(*pos, text, *font, *color, *align),
            }
        }
    }

    pub fn circle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub(crate) fn sanitize_ppp(ppp: f32) -> f32 {
    if ppp.is_finite() && ppp > 0.0 { ppp } else { 1.0 }
}

/// Everything one frame depends on.
#[derive(Debug, Clone, Copy)]
pub struct RenderState<'a> {
    pub snapshot: &'a ClusterSnapshot,
    /// Geometry computed for `snapshot`; recomputed here if it belongs to another revision.
    pub layout: &'a ClusterLayout,
    pub mode: HighlightMode,
    pub annotations: &'a Annotations,
    pub hovered: Option<ClusterId>,
    pub show_legend: bool,
    pub pixels_per_point: f32,
}

pub fn render(state: &RenderState<'_>) -> Frame {
    let layout: Cow<'_, ClusterLayout> =
        if state.layout.snapshot_revision == state.snapshot.revision() {
            Cow::Borrowed(state.layout)
        } else {
            tracing::warn!(
                "Layout revision {} does not match snapshot revision {}; recomputing",
                state.layout.snapshot_revision,
                state.snapshot.revision()
            );
            Cow::Owned(BubbleLayouter::default().layout(state.snapshot, state.layout.viewport))
        };

    let mut commands = Vec::with_capacity(state.snapshot.len() * 3 + 1);
    commands.push(DrawCommand::Clear {
        color: style::COLOR_BACKGROUND,
    });

    for (cluster, bubble) in state.snapshot.clusters().iter().zip(&layout.bubbles) {
        let hovered = state.hovered == Some(cluster.id);
        let flags = state.annotations.get(cluster.id);
        let BubbleStyle {
            fill,
            stroke,
            text,
            stroke_width,
        } = style::highlight_style(state.mode, flags, hovered);
        let center = bubble.circle.center;
        let radius = bubble.circle.radius;

        commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
            stroke_width,
        });

        if let Some(label) = truncate_label(&cluster.label, radius) {
            commands.push(DrawCommand::Text {
                pos: center,
                text: label,
                font: FontSpec::monospace(label_font_size(radius)),
                color: text,
                align: TextAlign::Center,
            });
        }

        commands.push(DrawCommand::Text {
            pos: Vec2::new(center.x, center.y + radius + COUNT_OFFSET),
            text: cluster.effective_size().to_string(),
            font: FontSpec::proportional(COUNT_FONT_SIZE),
            color: style::COLOR_COUNT_TEXT,
            align: TextAlign::Center,
        });
    }

    if state.show_legend {
        push_legend(&mut commands, state.mode);
    }

    Frame {
        logical_size: layout.viewport.size(),
        pixels_per_point: sanitize_ppp(state.pixels_per_point),
        commands,
    }
}

/// Label shown inside a bubble of `radius`, or `None` when the bubble is too small.
///
/// At most `floor(radius / 4)` characters are kept; a truncated label ends in `…`.
pub fn truncate_label(label: &str, radius: f32) -> Option<String> {
    if radius <= LABEL_MIN_RADIUS {
        return None;
    }
    let max_chars = (radius / 4.0).floor() as usize;
    if label.chars().count() <= max_chars {
        return Some(label.to_string());
    }
    let mut truncated: String = label.chars().take(max_chars).collect();
    truncated.push(ELLIPSIS);
    Some(truncated)
}

pub fn label_font_size(radius: f32) -> f32 {
    LABEL_MAX_FONT_SIZE.min(radius / 3.0)
}

fn push_legend(commands: &mut Vec<DrawCommand>, mode: HighlightMode) {
    let entries = legend_entries(mode);
    let origin = Vec2::new(10.0, 10.0);
    let row_height = 16.0;
    let panel = Rect::from_pos_size(
        origin,
        Vec2::new(150.0, 8.0 + row_height * entries.len() as f32),
    );
    commands.push(DrawCommand::Rect {
        rect: panel,
        fill: Color::rgba(15, 23, 42, 200),
    });

    for (i, entry) in entries.iter().enumerate() {
        let y = origin.y + 4.0 + row_height * (i as f32 + 0.5);
        commands.push(DrawCommand::Circle {
            center: Vec2::new(origin.x + 10.0, y),
            radius: 5.0,
            fill: entry.style.fill,
            stroke: entry.style.stroke,
            stroke_width: entry.style.stroke_width,
        });
        commands.push(DrawCommand::Text {
            pos: Vec2::new(origin.x + 22.0, y),
            text: entry.label.to_string(),
            font: FontSpec::proportional(LEGEND_FONT_SIZE),
            color: style::COLOR_ACCENT_TEXT,
            align: TextAlign::LeftCenter,
        });
    }
}
