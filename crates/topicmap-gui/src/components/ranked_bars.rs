//! Ranked bar chart of the largest clusters, drawn with egui_plot.

use egui_plot::{Bar, BarChart, Legend, Plot};
use topicmap_graph::RankedBar;

const LABEL_CHARS: usize = 18;

pub fn show(ui: &mut egui::Ui, bars: &[RankedBar], max_bars: &mut usize) {
    ui.heading("Largest clusters");

    if bars.is_empty() {
        ui.label("No cluster data available.");
        return;
    }

    let plot_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            Bar::new(i as f64, bar.count as f64)
                .width(0.7)
                .name(shorten(&bar.label, LABEL_CHARS))
        })
        .collect();

    Plot::new("ranked_clusters_plot")
        .legend(Legend::default())
        .height(220.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .y_axis_label("Papers")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new("Papers", plot_bars));
        });

    for (rank, bar) in bars.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(format!("{}.", rank + 1));
            ui.add(
                egui::ProgressBar::new(bar.fraction)
                    .desired_width(120.0)
                    .text(bar.count.to_string()),
            );
            ui.label(shorten(&bar.label, LABEL_CHARS * 2));
        });
    }

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("Show top:");
        ui.add(egui::Slider::new(max_bars, 1..=20));
    });
}

fn shorten(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Optics", 18), "Optics");
        assert_eq!(shorten("Single-cell atlases", 10), "Single-ce…");
    }
}
