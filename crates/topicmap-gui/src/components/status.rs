use std::time::{Duration, Instant};
use topicmap_core::ClusterId;
use topicmap_events::{Event, EventListener};

const MESSAGE_TTL: Duration = Duration::from_secs(6);

/// Bottom status bar fed from map events.
#[derive(Default)]
pub struct StatusLine {
    message: Option<(String, Instant)>,
    selected: Option<ClusterId>,
    cluster_count: Option<usize>,
}

impl StatusLine {
    pub fn selected(&self) -> Option<ClusterId> {
        self.selected
    }

    fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), Instant::now()));
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        if self
            .message
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() > MESSAGE_TTL)
        {
            self.message = None;
        }

        ui.horizontal(|ui| {
            if let Some(count) = self.cluster_count {
                ui.label(format!("{count} clusters"));
                ui.separator();
            }
            if let Some(id) = self.selected {
                ui.label(format!("Selected cluster {id}"));
                ui.separator();
            }
            if let Some((message, _)) = &self.message {
                ui.label(message);
            }
        });
    }
}

impl EventListener for StatusLine {
    fn handle_event(&mut self, event: &Event) {
        match event {
            Event::ClusterClicked { id } => self.selected = Some(*id),
            Event::LoadStarted { .. } => {
                self.cluster_count = None;
                self.selected = None;
            }
            Event::SnapshotLoaded { cluster_count, .. } => {
                self.cluster_count = Some(*cluster_count);
            }
            Event::LoadFailed { error, .. } => self.set_message(format!("Load failed: {error}")),
            Event::FrameExported { path } => self.set_message(format!("Saved {path}")),
            Event::ExportFailed { error } => self.set_message(format!("Export failed: {error}")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicmap_events::LoadKind;

    #[test]
    fn test_tracks_selection_and_reload() {
        let mut status = StatusLine::default();
        status.handle_event(&Event::SnapshotLoaded {
            generation: 1,
            cluster_count: 7,
        });
        status.handle_event(&Event::ClusterClicked { id: ClusterId(3) });
        assert_eq!(status.selected(), Some(ClusterId(3)));
        assert_eq!(status.cluster_count, Some(7));

        status.handle_event(&Event::LoadStarted { generation: 2 });
        assert_eq!(status.selected(), None);
        assert_eq!(status.cluster_count, None);

        status.handle_event(&Event::LoadFailed {
            generation: 2,
            kind: LoadKind::Snapshot,
            error: "offline".into(),
        });
        assert!(status.message.as_ref().unwrap().0.contains("offline"));
    }
}
