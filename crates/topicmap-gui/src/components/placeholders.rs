use topicmap_app::LoadState;

/// Centered message shown instead of the canvas. Returns `true` when a
/// placeholder was drawn and the canvas should be skipped.
pub fn show(ui: &mut egui::Ui, state: &LoadState) -> bool {
    let (icon, title, detail): (Option<&str>, &str, Option<&str>) = match state {
        LoadState::Ready => return false,
        LoadState::Idle | LoadState::Loading => (None, "Loading clusters…", None),
        LoadState::Empty => (
            Some("∅"),
            "No clusters yet",
            Some("The provider returned no topic clusters."),
        ),
        LoadState::Failed(message) => {
            (Some("⚠"), "Could not load clusters", Some(message.as_str()))
        }
    };

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.35);
        match icon {
            Some(icon) => ui.label(egui::RichText::new(icon).size(32.0)),
            None => ui.spinner(),
        };
        ui.label(egui::RichText::new(title).heading());
        if let Some(detail) = detail {
            ui.label(egui::RichText::new(detail).weak());
        }
    });
    true
}
