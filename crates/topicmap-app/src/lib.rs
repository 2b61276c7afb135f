//! Headless controller for one cluster map.
//!
//! Owns the loaded snapshot and everything derived from it, sequences provider
//! loads on background threads and turns pointer input into events. Any shell
//! (desktop viewer, CLI, tests) drives it through `poll`, `frame` and the
//! pointer methods.

mod loader;

use anyhow::Context;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use loader::{LoadOutcome, LoadRequest, LoadResult, LoadTracker, SharedTracker, spawn_load};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use topicmap_core::{
    Annotations, Cluster, ClusterSnapshot, EpisodeId, HighlightMode, MapConfig,
};
use topicmap_events::{Event, EventBus};
use topicmap_graph::{
    ClusterLayout, ComparisonSummary, Frame, HitTester, InteractionResponse, LayoutCache,
    PointerInteraction, RankedBar, RasterSurface, RenderState, TooltipContent, Vec2, Viewport,
    items_from_snapshot, rank_bars, render,
};
use topicmap_provider::ClusterProvider;

pub use topicmap_events::LoadKind;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load has been issued yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// Load succeeded with zero clusters.
    Empty,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

pub struct MapController {
    provider: Arc<dyn ClusterProvider>,
    events: EventBus,
    config: MapConfig,
    tracker: SharedTracker,
    outcomes_tx: Sender<LoadOutcome>,
    outcomes_rx: Receiver<LoadOutcome>,
    applied_generation: u64,
    state: LoadState,
    snapshot: Option<Arc<ClusterSnapshot>>,
    annotations: Annotations,
    summary: Option<ComparisonSummary>,
    layout_cache: LayoutCache,
    hit_tester: HitTester,
    pointer: PointerInteraction,
}

impl MapController {
    pub fn new(provider: Arc<dyn ClusterProvider>, config: MapConfig) -> Self {
        Self::with_event_bus(provider, config, EventBus::new())
    }

    pub fn with_event_bus(
        provider: Arc<dyn ClusterProvider>,
        config: MapConfig,
        events: EventBus,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = unbounded();
        Self {
            provider,
            events,
            config,
            tracker: Arc::new(Mutex::new(LoadTracker::default())),
            outcomes_tx,
            outcomes_rx,
            applied_generation: 0,
            state: LoadState::Idle,
            snapshot: None,
            annotations: Annotations::new(),
            summary: None,
            layout_cache: LayoutCache::default(),
            hit_tester: HitTester::new(),
            pointer: PointerInteraction::new(),
        }
    }

    /// Subscribe to map events. Intended for a single pump in the host.
    pub fn events(&self) -> Receiver<Event> {
        self.events.receiver()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&ClusterSnapshot> {
        self.snapshot.as_deref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn summary(&self) -> Option<&ComparisonSummary> {
        self.summary.as_ref()
    }

    pub fn latest_generation(&self) -> u64 {
        self.tracker.lock().latest
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Issue a fresh load for the current config. Returns its generation.
    ///
    /// Current data is dropped immediately; nothing from the previous
    /// snapshot stays visible or hoverable while the new one is in flight.
    pub fn reload(&mut self) -> u64 {
        let generation = {
            let mut tracker = self.tracker.lock();
            tracker.latest += 1;
            tracker.latest
        };

        self.clear_data();
        self.state = LoadState::Loading;

        let episode_id = if self.config.wants_comparison() {
            self.config.episode_id.clone()
        } else {
            None
        };
        tracing::info!(
            "Loading clusters (generation {}, mode {}, episode {:?})",
            generation,
            self.config.highlight_mode,
            episode_id.as_ref().map(EpisodeId::as_str)
        );
        self.events.publish(Event::LoadStarted { generation });

        spawn_load(
            Arc::clone(&self.provider),
            Arc::clone(&self.tracker),
            LoadRequest {
                generation,
                episode_id,
            },
            self.outcomes_tx.clone(),
        );
        generation
    }

    /// Replace the config. Reloads only when the mode or episode changed;
    /// size and legend changes just re-derive geometry.
    pub fn set_config(&mut self, config: MapConfig) -> bool {
        let reload = self.config.requires_reload(&config) || self.state == LoadState::Idle;
        if self.config.highlight_mode != config.highlight_mode {
            self.events.publish(Event::HighlightModeChanged {
                mode: config.highlight_mode,
            });
        }
        if self.config.episode_id != config.episode_id {
            self.events.publish(Event::EpisodeSelected {
                episode_id: config.episode_id.clone(),
            });
        }
        self.config = config;

        if reload {
            self.reload();
        } else {
            self.sync_geometry();
        }
        reload
    }

    pub fn set_highlight_mode(&mut self, mode: HighlightMode) -> bool {
        let mut config = self.config.clone();
        config.highlight_mode = mode;
        self.set_config(config)
    }

    pub fn set_episode(&mut self, episode_id: Option<EpisodeId>) -> bool {
        let mut config = self.config.clone();
        config.episode_id = episode_id;
        self.set_config(config)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.sync_geometry();
    }

    pub fn set_show_legend(&mut self, show_legend: bool) {
        self.config.show_legend = show_legend;
    }

    /// Apply every finished load without blocking. Returns whether the
    /// current generation was applied by this call.
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            applied |= self.apply_outcome(outcome);
        }
        applied
    }

    /// Block until the latest load is applied or `timeout` elapses.
    pub fn wait_for_load(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.applied_generation != self.latest_generation() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.outcomes_rx.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply_outcome(outcome);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false;
                }
            }
        }
        true
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) -> bool {
        let latest = self.latest_generation();
        if outcome.generation != latest {
            tracing::warn!(
                "Discarding load result for generation {} (latest is {})",
                outcome.generation,
                latest
            );
            self.events.publish(Event::StaleLoadDiscarded {
                generation: outcome.generation,
                latest,
            });
            return false;
        }
        self.applied_generation = outcome.generation;

        match outcome.result {
            LoadResult::Loaded {
                snapshot,
                comparison,
            } => {
                let cluster_count = snapshot.len();
                tracing::info!(
                    "Loaded {} clusters (generation {})",
                    cluster_count,
                    outcome.generation
                );
                self.annotations = comparison
                    .as_ref()
                    .map(Annotations::from_comparison)
                    .unwrap_or_default();
                self.summary = comparison.as_ref().map(ComparisonSummary::from_result);
                self.state = if snapshot.is_empty() {
                    LoadState::Empty
                } else {
                    LoadState::Ready
                };
                self.snapshot = Some(Arc::new(snapshot));
                self.sync_geometry();
                self.events.publish(Event::SnapshotLoaded {
                    generation: outcome.generation,
                    cluster_count,
                });
            }
            LoadResult::Failed { kind, message } => {
                tracing::error!(
                    "Cluster load failed ({:?}, generation {}): {}",
                    kind,
                    outcome.generation,
                    message
                );
                self.clear_data();
                self.state = LoadState::Failed(message.clone());
                self.events.publish(Event::LoadFailed {
                    generation: outcome.generation,
                    kind,
                    error: message,
                });
            }
            LoadResult::Superseded => {
                // Unreachable for the latest generation; treat like a stale result.
                tracing::debug!("Generation {} reported superseded", outcome.generation);
                return false;
            }
        }
        true
    }

    fn clear_data(&mut self) {
        self.snapshot = None;
        self.annotations = Annotations::new();
        self.summary = None;
        self.layout_cache.invalidate();
        self.hit_tester.clear();
        let response = self.pointer.refresh(&self.hit_tester);
        self.publish_interaction(&response);
    }

    /// Recompute geometry for the current snapshot and viewport, and re-run
    /// hover detection under a stationary cursor.
    fn sync_geometry(&mut self) {
        match self.layout() {
            Some(layout) => self.hit_tester.update(&layout),
            None => self.hit_tester.clear(),
        }
        let response = self.pointer.refresh(&self.hit_tester);
        self.publish_interaction(&response);
    }

    /// Geometry for the current snapshot, computed at most once per
    /// (snapshot, viewport) pair.
    pub fn layout(&mut self) -> Option<Arc<ClusterLayout>> {
        let viewport = self.viewport();
        let snapshot = self.snapshot.as_ref()?;
        Some(self.layout_cache.get_or_compute(snapshot, viewport))
    }

    /// Display list for the current state, or `None` when there is nothing
    /// to draw (loading, empty, failed).
    pub fn frame(&mut self, pixels_per_point: f32) -> Option<Frame> {
        if self.state != LoadState::Ready {
            return None;
        }
        let layout = self.layout()?;
        let snapshot = self.snapshot.as_ref()?;
        Some(render(&RenderState {
            snapshot,
            layout: &layout,
            mode: self.config.highlight_mode,
            annotations: &self.annotations,
            hovered: self.pointer.hovered(),
            show_legend: self.config.show_legend,
            pixels_per_point,
        }))
    }

    pub fn pointer_moved(&mut self, pos: Vec2) -> InteractionResponse {
        let response = self.pointer.pointer_moved(pos, &self.hit_tester);
        self.publish_interaction(&response);
        response
    }

    pub fn pointer_left(&mut self) -> InteractionResponse {
        let response = self.pointer.pointer_left();
        self.publish_interaction(&response);
        response
    }

    pub fn clicked(&mut self) -> InteractionResponse {
        let response = self.pointer.clicked();
        self.publish_interaction(&response);
        response
    }

    fn publish_interaction(&self, response: &InteractionResponse) {
        if let Some(id) = response.hover_changed {
            self.events.publish(Event::ClusterHovered { id });
        }
        if let Some(id) = response.clicked {
            self.events.publish(Event::ClusterClicked { id });
        }
    }

    pub fn hovered_cluster(&self) -> Option<&Cluster> {
        let id = self.pointer.hovered()?;
        self.snapshot.as_ref()?.get(id)
    }

    pub fn tooltip(&self) -> Option<TooltipContent> {
        self.hovered_cluster().map(TooltipContent::for_cluster)
    }

    pub fn pointer_pos(&self) -> Option<Vec2> {
        self.pointer.last_pos()
    }

    pub fn ranked_bars(&self, max_bars: usize) -> Vec<RankedBar> {
        self.snapshot
            .as_ref()
            .map(|snapshot| rank_bars(&items_from_snapshot(snapshot), max_bars))
            .unwrap_or_default()
    }

    /// Rasterize the current frame to a PNG file.
    pub fn export_png(&mut self, path: &Path, pixels_per_point: f32) -> anyhow::Result<PathBuf> {
        let result = self
            .frame(pixels_per_point)
            .context("Nothing to export: no clusters are loaded")
            .and_then(|frame| {
                let mut surface = RasterSurface::from_env();
                frame.paint(&mut surface);
                surface.save_png(path)
            });

        match &result {
            Ok(written) => {
                tracing::info!("Exported map to {}", written.display());
                self.events.publish(Event::FrameExported {
                    path: written.to_string_lossy().to_string(),
                });
            }
            Err(e) => {
                tracing::error!("Map export failed: {e:#}");
                self.events.publish(Event::ExportFailed {
                    error: format!("{e:#}"),
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicmap_core::{ClusterId, NormalizedPos};
    use topicmap_provider::StaticProvider;

    fn ready_controller() -> MapController {
        let provider = StaticProvider::new(vec![
            Cluster::new(1, "Left", NormalizedPos::new(0.0, 0.5), 10),
            Cluster::new(2, "Right", NormalizedPos::new(1.0, 0.5), 5),
        ]);
        let mut controller = MapController::new(Arc::new(provider), MapConfig::default());
        controller.reload();
        assert!(controller.wait_for_load(Duration::from_secs(5)));
        controller
    }

    #[test]
    fn test_resize_rebuilds_hit_geometry() {
        let mut controller = ready_controller();
        // Default 800x600, padding 50: cluster 1 sits at (50, 300).
        assert_eq!(
            controller.pointer_moved(Vec2::new(50.0, 300.0)).hover_changed,
            Some(Some(ClusterId(1)))
        );

        // At 400x600 cluster 2 moves from x=750 to x=350.
        controller.resize(400.0, 600.0);
        controller.pointer_moved(Vec2::new(350.0, 300.0));
        assert_eq!(controller.hovered_cluster().map(|c| c.id), Some(ClusterId(2)));
        assert_eq!(controller.latest_generation(), 1);
    }

    #[test]
    fn test_frame_only_when_ready() {
        let mut controller = ready_controller();
        let frame = controller.frame(2.0).unwrap();
        assert_eq!(frame.circle_count(), 2);
        assert_eq!(frame.backing_size(), (1600, 1200));

        controller.reload();
        assert!(controller.state().is_loading());
        assert!(controller.frame(1.0).is_none());
    }

    #[test]
    fn test_tooltip_and_ranking() {
        let mut controller = ready_controller();
        assert!(controller.tooltip().is_none());
        controller.pointer_moved(Vec2::new(50.0, 300.0));
        assert_eq!(controller.tooltip().unwrap().title, "Left");

        let bars = controller.ranked_bars(6);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].label, "Left");
        assert_eq!(bars[1].fraction, 0.5);
    }
}
