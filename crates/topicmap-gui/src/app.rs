use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use topicmap_app::MapController;
use topicmap_core::{EpisodeId, HighlightMode};
use topicmap_provider::{ClusterProvider, JsonFileProvider, ProviderConfig, StaticProvider};

use crate::components::cluster_map::ClusterMapView;
use crate::components::status::StatusLine;
use crate::components::{comparison_panel, placeholders, ranked_bars};
use crate::settings::{AppSettings, ThemeMode};
use crate::theme::{self, spacing};

pub struct TopicMapApp {
    controller: MapController,
    settings: AppSettings,
    map_view: ClusterMapView,
    status: StatusLine,
    episode_input: String,
    data_dir_input: String,
}

fn build_provider(settings: &AppSettings) -> Arc<dyn ClusterProvider> {
    match &settings.data_dir {
        Some(dir) => {
            tracing::info!("Reading clusters from {:?}", dir);
            Arc::new(JsonFileProvider::new(ProviderConfig::new(dir)))
        }
        None => {
            tracing::info!("No data directory configured, showing the demo map");
            Arc::new(StaticProvider::demo())
        }
    }
}

fn mode_label(mode: HighlightMode) -> &'static str {
    match mode {
        HighlightMode::None => "Plain",
        HighlightMode::Episode => "Episode",
        HighlightMode::Notebook => "Notebook",
        HighlightMode::Comparison => "Comparison",
    }
}

fn export_path() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicmap.png")
}

impl TopicMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        theme::apply(&cc.egui_ctx, settings.theme);

        let mut controller = MapController::new(build_provider(&settings), settings.map_config());
        controller.reload();

        Self {
            episode_input: settings.episode_id.clone().unwrap_or_default(),
            data_dir_input: settings
                .data_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            controller,
            settings,
            map_view: ClusterMapView::new(),
            status: StatusLine::default(),
        }
    }

    fn persist(&mut self) {
        self.settings.remember(self.controller.config());
        self.settings.save();
    }

    /// Swap the provider. The controller is rebuilt so no outcome from the
    /// old provider can land on the new map.
    fn open_data_dir(&mut self) {
        let trimmed = self.data_dir_input.trim();
        self.settings.data_dir = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        let config = self.controller.config().clone();
        self.controller = MapController::new(build_provider(&self.settings), config);
        self.controller.reload();
        self.persist();
    }

    fn apply_episode_input(&mut self) {
        let trimmed = self.episode_input.trim();
        let episode = (!trimmed.is_empty()).then(|| EpisodeId::new(trimmed));
        if self.controller.set_episode(episode) {
            self.persist();
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let mut mode = self.controller.config().highlight_mode;
            egui::ComboBox::from_label("Highlight")
                .selected_text(mode_label(mode))
                .show_ui(ui, |ui| {
                    for candidate in HighlightMode::ALL {
                        ui.selectable_value(&mut mode, candidate, mode_label(candidate));
                    }
                });
            if mode != self.controller.config().highlight_mode {
                self.controller.set_highlight_mode(mode);
                self.persist();
            }

            ui.separator();
            ui.label("Episode:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.episode_input)
                    .hint_text("episode id")
                    .desired_width(140.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if submitted || ui.button("Compare").clicked() {
                self.apply_episode_input();
            }

            ui.separator();
            let mut show_legend = self.controller.config().show_legend;
            if ui.checkbox(&mut show_legend, "Legend").changed() {
                self.controller.set_show_legend(show_legend);
                self.persist();
            }
            ui.checkbox(&mut self.settings.show_side_panel, "Insights");

            ui.separator();
            if ui.button("Reload").clicked() {
                self.controller.reload();
            }
            if ui.button("Export PNG").clicked() {
                let ppp = ui.ctx().pixels_per_point();
                // Success and failure both surface through the event bus.
                let _ = self.controller.export_png(&export_path(), ppp);
            }
        });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Data directory:");
            ui.add(
                egui::TextEdit::singleline(&mut self.data_dir_input)
                    .hint_text("empty for demo data")
                    .desired_width(260.0),
            );
            if ui.button("Open").clicked() {
                self.open_data_dir();
            }

            ui.separator();
            let mut selected = self.settings.theme;
            egui::ComboBox::from_label("Theme")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for mode in ThemeMode::ALL {
                        ui.selectable_value(&mut selected, mode, mode.label());
                    }
                });
            if selected != self.settings.theme {
                self.settings.theme = selected;
                theme::apply(ui.ctx(), selected);
                self.persist();
            }
        });
    }

    fn insights(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add_space(spacing::PANEL_PADDING);
            let config = self.controller.config();
            if config.show_legend {
                ui.heading("Legend");
                comparison_panel::legend(ui, config.highlight_mode);
                ui.add_space(spacing::SECTION_SPACING);
            }

            if let Some(summary) = self.controller.summary() {
                comparison_panel::show(ui, summary, self.controller.snapshot());
                ui.add_space(spacing::SECTION_SPACING);
            }

            let bars = self.controller.ranked_bars(self.settings.max_bars);
            let before = self.settings.max_bars;
            ranked_bars::show(ui, &bars, &mut self.settings.max_bars);
            if self.settings.max_bars != before {
                self.settings.save();
            }
        });
    }
}

impl eframe::App for TopicMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();
        self.controller.event_bus().dispatch_to(&mut self.status);
        if self.controller.state().is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        egui::TopBottomPanel::top("map_controls").show(ctx, |ui| {
            ui.add_space(4.0);
            self.controls(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status.ui(ui);
        });

        if self.settings.show_side_panel {
            egui::SidePanel::right("insights_panel")
                .default_width(300.0)
                .show(ctx, |ui| self.insights(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if !placeholders::show(ui, self.controller.state()) {
                    self.map_view.show(ui, &mut self.controller);
                }
            });
    }
}
