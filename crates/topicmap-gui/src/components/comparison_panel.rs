use topicmap_core::{ClusterSnapshot, HighlightMode};
use topicmap_graph::{ComparisonSummary, NEW_TERRITORY_PREVIEW, legend_entries};

use crate::theme::{muted_text, spacing, to_color32};

/// Overlap statistics and the new-territory preview for the selected episode.
pub fn show(ui: &mut egui::Ui, summary: &ComparisonSummary, snapshot: Option<&ClusterSnapshot>) {
    ui.heading("Episode vs. notebook");
    ui.label(
        egui::RichText::new(format!("Episode {}", summary.episode_id))
            .small()
            .color(muted_text(ui)),
    );
    ui.add_space(spacing::ITEM_SPACING);

    if summary.is_empty() {
        ui.label("This episode does not touch any clusters.");
        return;
    }

    egui::Grid::new("comparison_stats")
        .num_columns(2)
        .spacing([spacing::SECTION_SPACING, 4.0])
        .show(ui, |ui| {
            ui.label("Clusters covered");
            ui.label(summary.episode_cluster_count.to_string());
            ui.end_row();
            ui.label("Already in notebook");
            ui.label(summary.overlap_count.to_string());
            ui.end_row();
            ui.label("New territory");
            ui.label(summary.new_territory_count.to_string());
            ui.end_row();
        });

    if summary.new_territory_count == 0 {
        return;
    }

    ui.add_space(spacing::ITEM_SPACING);
    ui.label(egui::RichText::new("New to you").strong());
    let preview = summary.new_territory_preview(NEW_TERRITORY_PREVIEW);
    for label in summary.preview_labels(snapshot, NEW_TERRITORY_PREVIEW) {
        ui.label(format!("• {label}"));
    }
    if preview.remaining > 0 {
        ui.label(
            egui::RichText::new(format!("+{} more", preview.remaining)).color(muted_text(ui)),
        );
    }
}

/// Swatches explaining the bubble colors of `mode`.
pub fn legend(ui: &mut egui::Ui, mode: HighlightMode) {
    for entry in legend_entries(mode) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter()
                .circle_filled(rect.center(), 6.0, to_color32(entry.style.fill));
            ui.painter().circle_stroke(
                rect.center(),
                6.0,
                egui::Stroke::new(entry.style.stroke_width, to_color32(entry.style.stroke)),
            );
            ui.label(entry.label);
        });
    }
}
