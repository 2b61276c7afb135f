//! Catppuccin theming and conversions from map colors to egui colors.

use egui::Color32;
use topicmap_graph::Color;

use crate::settings::ThemeMode;

pub mod spacing {
    pub const PANEL_PADDING: f32 = 12.0;
    pub const ITEM_SPACING: f32 = 8.0;
    pub const SECTION_SPACING: f32 = 16.0;
}

pub fn flavor(mode: ThemeMode) -> catppuccin_egui::Theme {
    match mode {
        ThemeMode::Latte => catppuccin_egui::LATTE,
        ThemeMode::Frappe => catppuccin_egui::FRAPPE,
        ThemeMode::Macchiato => catppuccin_egui::MACCHIATO,
        ThemeMode::Mocha => catppuccin_egui::MOCHA,
    }
}

pub fn apply(ctx: &egui::Context, mode: ThemeMode) {
    catppuccin_egui::set_theme(ctx, flavor(mode));
}

/// Map colors are straight (non-premultiplied) RGBA.
pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn muted_text(ui: &egui::Ui) -> Color32 {
    ui.visuals().weak_text_color()
}
