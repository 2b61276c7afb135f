use crate::geometry::Vec2;
use crate::hit_tester::HitTester;
use topicmap_core::ClusterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

impl CursorStyle {
    fn for_hover(hovered: Option<ClusterId>) -> Self {
        if hovered.is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        }
    }
}

/// What a pointer event changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionResponse {
    /// `Some(new_hover)` only when the hovered cluster changed.
    pub hover_changed: Option<Option<ClusterId>>,
    pub clicked: Option<ClusterId>,
    pub cursor: CursorStyle,
}

impl InteractionResponse {
    /// Whether the frame must be redrawn. Hit-testing alone never asks for one.
    pub fn needs_redraw(&self) -> bool {
        self.hover_changed.is_some()
    }
}

/// Hover/click state machine over a `HitTester`.
#[derive(Debug, Clone, Default)]
pub struct PointerInteraction {
    hovered: Option<ClusterId>,
    last_pos: Option<Vec2>,
}

impl PointerInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<ClusterId> {
        self.hovered
    }

    pub fn last_pos(&self) -> Option<Vec2> {
        self.last_pos
    }

    pub fn pointer_moved(&mut self, pos: Vec2, tester: &HitTester) -> InteractionResponse {
        self.last_pos = Some(pos);
        let hit = tester.hit_test(pos);
        self.set_hovered(hit)
    }

    pub fn pointer_left(&mut self) -> InteractionResponse {
        self.last_pos = None;
        self.set_hovered(None)
    }

    /// A click reports the hovered cluster; clicking empty space does nothing.
    pub fn clicked(&self) -> InteractionResponse {
        InteractionResponse {
            hover_changed: None,
            clicked: self.hovered,
            cursor: CursorStyle::for_hover(self.hovered),
        }
    }

    /// Re-run the hit test at the last cursor position, e.g. after the
    /// geometry was replaced under a stationary cursor.
    pub fn refresh(&mut self, tester: &HitTester) -> InteractionResponse {
        let hit = self.last_pos.and_then(|pos| tester.hit_test(pos));
        self.set_hovered(hit)
    }

    fn set_hovered(&mut self, hovered: Option<ClusterId>) -> InteractionResponse {
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        InteractionResponse {
            hover_changed: changed.then_some(hovered),
            clicked: None,
            cursor: CursorStyle::for_hover(hovered),
        }
    }
}
