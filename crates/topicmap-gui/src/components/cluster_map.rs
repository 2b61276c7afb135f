use topicmap_app::MapController;
use topicmap_graph::{
    Color, CursorStyle, FontFamily, FontSpec, Rect, Surface, TOOLTIP_OFFSET, TextAlign,
    TooltipContent, Vec2, place_tooltip,
};

use crate::theme::to_color32;

/// Replays map draw commands onto an egui painter.
///
/// egui applies the pixels-per-point scale itself, so commands are drawn in
/// logical points offset by the canvas origin.
struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
}

impl PainterSurface<'_> {
    fn pos(&self, v: Vec2) -> egui::Pos2 {
        self.origin + egui::vec2(v.x, v.y)
    }
}

impl Surface for PainterSurface<'_> {
    fn begin_frame(&mut self, _logical_size: Vec2, _pixels_per_point: f32) {}

    fn clear(&mut self, color: Color) {
        self.painter
            .rect_filled(self.painter.clip_rect(), 0.0, to_color32(color));
    }

    fn circle(&mut self, center: Vec2, radius: f32, fill: Color, stroke: Color, stroke_width: f32) {
        let center = self.pos(center);
        self.painter.circle_filled(center, radius, to_color32(fill));
        self.painter.circle_stroke(
            center,
            radius,
            egui::Stroke::new(stroke_width, to_color32(stroke)),
        );
    }

    fn rect(&mut self, rect: Rect, fill: Color) {
        let rect = egui::Rect::from_min_max(self.pos(rect.min), self.pos(rect.max));
        self.painter.rect_filled(rect, 2.0, to_color32(fill));
    }

    fn text(&mut self, pos: Vec2, text: &str, font: FontSpec, color: Color, align: TextAlign) {
        let font_id = match font.family {
            FontFamily::Monospace => egui::FontId::monospace(font.size),
            FontFamily::Proportional => egui::FontId::proportional(font.size),
        };
        let anchor = match align {
            TextAlign::Center => egui::Align2::CENTER_CENTER,
            TextAlign::LeftCenter => egui::Align2::LEFT_CENTER,
        };
        self.painter
            .text(self.pos(pos), anchor, text, font_id, to_color32(color));
    }
}

/// The map canvas plus its hover tooltip.
#[derive(Default)]
pub struct ClusterMapView {
    /// Tooltip size measured on the previous frame, used for edge clamping.
    tooltip_size: Option<egui::Vec2>,
}

impl ClusterMapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, controller: &mut MapController) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click());
        controller.resize(rect.width(), rect.height());

        let interaction = match response.hover_pos() {
            Some(pointer) => controller.pointer_moved(Vec2::new(
                pointer.x - rect.min.x,
                pointer.y - rect.min.y,
            )),
            None => controller.pointer_left(),
        };
        if response.clicked() {
            controller.clicked();
        }
        if interaction.cursor == CursorStyle::Pointer {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let Some(frame) = controller.frame(ui.ctx().pixels_per_point()) else {
            return;
        };
        let painter = ui.painter_at(rect);
        frame.paint(&mut PainterSurface {
            painter: &painter,
            origin: rect.min,
        });

        if let (Some(content), Some(cursor)) = (controller.tooltip(), controller.pointer_pos()) {
            self.show_tooltip(ui.ctx(), rect, cursor, &content);
        }
    }

    fn show_tooltip(
        &mut self,
        ctx: &egui::Context,
        canvas: egui::Rect,
        cursor: Vec2,
        content: &TooltipContent,
    ) {
        let measured = self.tooltip_size.unwrap_or(egui::vec2(220.0, 80.0));
        let local = place_tooltip(
            cursor,
            Vec2::new(measured.x, measured.y),
            Vec2::new(canvas.width(), canvas.height()),
            TOOLTIP_OFFSET,
        );

        let area = egui::Area::new(egui::Id::new("cluster_tooltip"))
            .fixed_pos(canvas.min + egui::vec2(local.x, local.y))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(260.0);
                    ui.label(egui::RichText::new(&content.title).strong());
                    if !content.description.is_empty() {
                        ui.label(&content.description);
                    }
                    if !content.keywords.is_empty() {
                        ui.label(
                            egui::RichText::new(content.keywords.join(", "))
                                .small()
                                .italics(),
                        );
                    }
                    ui.separator();
                    ui.label(egui::RichText::new(content.stats_line()).small());
                });
            });
        self.tooltip_size = Some(area.response.rect.size());
    }
}
