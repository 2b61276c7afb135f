use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use topicmap_core::{ClusterId, EpisodeId, HighlightMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadKind {
    Snapshot,
    Comparison,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Pointer callbacks
    ClusterHovered {
        id: Option<ClusterId>,
    },
    ClusterClicked {
        id: ClusterId,
    },

    // Configuration
    HighlightModeChanged {
        mode: HighlightMode,
    },
    EpisodeSelected {
        episode_id: Option<EpisodeId>,
    },

    // Loading
    LoadStarted {
        generation: u64,
    },
    SnapshotLoaded {
        generation: u64,
        cluster_count: usize,
    },
    LoadFailed {
        generation: u64,
        kind: LoadKind,
        error: String,
    },
    StaleLoadDiscarded {
        generation: u64,
        latest: u64,
    },

    // Export
    FrameExported {
        path: String,
    },
    ExportFailed {
        error: String,
    },
}

/// Unbounded multi-producer channel carrying map events to whichever host pumps it.
#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Drain everything currently queued.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
