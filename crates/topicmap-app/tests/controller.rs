use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use topicmap_app::{LoadKind, LoadState, MapController};
use topicmap_core::{
    Cluster, ClusterId, ClusterSnapshot, ComparisonResult, EpisodeId, HighlightMode, MapConfig,
    NormalizedPos,
};
use topicmap_events::Event;
use topicmap_graph::Vec2;
use topicmap_provider::{
    ClusterProvider, JsonFileProvider, ProviderConfig, ProviderError, StaticProvider,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn clusters() -> Vec<Cluster> {
    vec![
        Cluster::new(1, "Optics", NormalizedPos::new(0.2, 0.2), 10),
        Cluster::new(2, "Lasers", NormalizedPos::new(0.5, 0.5), 6),
        Cluster::new(3, "Photonics", NormalizedPos::new(0.8, 0.8), 3),
        Cluster::new(4, "Imaging", NormalizedPos::new(0.2, 0.8), 1),
    ]
}

fn comparison_config(episode: &str) -> MapConfig {
    MapConfig {
        highlight_mode: HighlightMode::Comparison,
        episode_id: Some(EpisodeId::new(episode)),
        ..MapConfig::default()
    }
}

/// Provider whose comparison fetches block until the test opens a gate for
/// that episode, so response ordering is under test control.
struct GatedProvider {
    entered: Sender<EpisodeId>,
    gates: Mutex<HashMap<EpisodeId, Receiver<()>>>,
}

impl GatedProvider {
    fn new(episodes: &[&str]) -> (Arc<Self>, Receiver<EpisodeId>, HashMap<String, Sender<()>>) {
        let (entered_tx, entered_rx) = unbounded();
        let mut gates = HashMap::new();
        let mut openers = HashMap::new();
        for episode in episodes {
            let (tx, rx) = bounded(1);
            gates.insert(EpisodeId::new(*episode), rx);
            openers.insert(episode.to_string(), tx);
        }
        let provider = Arc::new(Self {
            entered: entered_tx,
            gates: Mutex::new(gates),
        });
        (provider, entered_rx, openers)
    }
}

impl ClusterProvider for GatedProvider {
    fn load_cluster_snapshot(&self) -> Result<ClusterSnapshot, ProviderError> {
        Ok(ClusterSnapshot::new(clusters())?)
    }

    fn load_episode_comparison(
        &self,
        episode_id: &EpisodeId,
    ) -> Result<ComparisonResult, ProviderError> {
        let gate = self.gates.lock().remove(episode_id);
        let _ = self.entered.send(episode_id.clone());
        if let Some(gate) = gate {
            let _ = gate.recv_timeout(TIMEOUT);
        }
        let covered = if episode_id.as_str() == "ep-a" {
            vec![ClusterId(1)]
        } else {
            vec![ClusterId(2), ClusterId(3)]
        };
        Ok(ComparisonResult::from_coverage(
            episode_id.clone(),
            &covered,
            &[ClusterId(3)],
        ))
    }
}

#[test]
fn test_late_response_does_not_overwrite_newer_state() {
    let (provider, entered, openers) = GatedProvider::new(&["ep-a", "ep-b"]);
    let mut controller = MapController::new(provider, comparison_config("ep-a"));
    let events = controller.events();

    let first = controller.reload();
    assert_eq!(entered.recv_timeout(TIMEOUT).unwrap(), EpisodeId::new("ep-a"));

    assert!(controller.set_episode(Some(EpisodeId::new("ep-b"))));
    let second = controller.latest_generation();
    assert!(second > first);
    assert_eq!(entered.recv_timeout(TIMEOUT).unwrap(), EpisodeId::new("ep-b"));

    openers["ep-b"].send(()).unwrap();
    assert!(controller.wait_for_load(TIMEOUT));
    assert_eq!(controller.state(), &LoadState::Ready);
    assert_eq!(
        controller.summary().unwrap().episode_id,
        EpisodeId::new("ep-b")
    );

    // The first request resolves last and must be dropped.
    openers["ep-a"].send(()).unwrap();
    let deadline = Instant::now() + TIMEOUT;
    loop {
        controller.poll();
        let discarded = events.try_iter().any(|event| {
            matches!(event, Event::StaleLoadDiscarded { generation, latest }
                if generation == first && latest == second)
        });
        if discarded {
            break;
        }
        assert!(Instant::now() < deadline, "stale outcome never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(
        controller.summary().unwrap().episode_id,
        EpisodeId::new("ep-b")
    );
    assert_eq!(controller.summary().unwrap().overlapping, vec![ClusterId(3)]);
}

#[test]
fn test_empty_snapshot_is_distinct_from_loading() {
    let mut controller = MapController::new(
        Arc::new(StaticProvider::default()),
        MapConfig::default(),
    );
    assert_eq!(controller.state(), &LoadState::Idle);

    controller.reload();
    assert_eq!(controller.state(), &LoadState::Loading);
    assert!(controller.wait_for_load(TIMEOUT));
    assert_eq!(controller.state(), &LoadState::Empty);
    assert!(controller.frame(1.0).is_none());
}

#[test]
fn test_snapshot_failure_shows_error_state() {
    let provider = Arc::new(StaticProvider::new(clusters()));
    provider.set_snapshot_error(Some("connection refused".into()));
    let mut controller = MapController::new(provider.clone(), MapConfig::default());
    let events = controller.events();

    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));
    match controller.state() {
        LoadState::Failed(message) => assert!(message.contains("connection refused")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(controller.snapshot().is_none());
    assert!(events.try_iter().any(|event| matches!(
        event,
        Event::LoadFailed {
            kind: LoadKind::Snapshot,
            ..
        }
    )));

    // No retries: recovery only happens on the next explicit load.
    provider.set_snapshot_error(None);
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));
    assert_eq!(controller.state(), &LoadState::Ready);
}

#[test]
fn test_comparison_mode_annotations_and_summary() {
    let provider = StaticProvider::new(clusters()).with_comparison(
        ComparisonResult::from_coverage(
            EpisodeId::new("ep-1"),
            &[ClusterId(1), ClusterId(2), ClusterId(3)],
            &[ClusterId(2), ClusterId(3), ClusterId(4)],
        ),
    );
    let mut controller = MapController::new(Arc::new(provider), comparison_config("ep-1"));
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));

    let summary = controller.summary().unwrap();
    assert_eq!(summary.overlapping, vec![ClusterId(2), ClusterId(3)]);
    assert_eq!(summary.new_clusters, vec![ClusterId(1)]);
    assert_eq!(summary.episode_cluster_count, 3);

    let flags = controller.annotations().get(ClusterId(4)).unwrap();
    assert!(!flags.in_episode && flags.in_notebook);

    // Leaving comparison mode reloads without a comparison.
    assert!(controller.set_highlight_mode(HighlightMode::None));
    assert!(controller.wait_for_load(TIMEOUT));
    assert!(controller.summary().is_none());
    assert!(controller.annotations().is_empty());
}

#[test]
fn test_resize_and_legend_do_not_reload() {
    let mut controller = MapController::new(
        Arc::new(StaticProvider::new(clusters())),
        MapConfig::default(),
    );
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));
    let generation = controller.latest_generation();

    let mut config = controller.config().clone();
    config.width = 1024.0;
    config.show_legend = true;
    assert!(!controller.set_config(config));
    assert_eq!(controller.latest_generation(), generation);

    let frame = controller.frame(1.0).unwrap();
    assert_eq!(frame.logical_size, Vec2::new(1024.0, 600.0));
}

#[test]
fn test_pointer_events_reach_the_bus() {
    let mut controller = MapController::new(
        Arc::new(StaticProvider::new(clusters())),
        MapConfig::default(),
    );
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));
    let events = controller.events();
    events.try_iter().for_each(drop);

    // Cluster 2 at the center of 800x600.
    controller.pointer_moved(Vec2::new(400.0, 300.0));
    controller.pointer_moved(Vec2::new(402.0, 301.0));
    controller.clicked();
    controller.pointer_left();
    controller.clicked();

    let received: Vec<Event> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            Event::ClusterHovered {
                id: Some(ClusterId(2))
            },
            Event::ClusterClicked { id: ClusterId(2) },
            Event::ClusterHovered { id: None },
        ]
    );
}

#[test]
fn test_export_png_from_json_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("clusters.json"),
        r#"[{"id": 1, "label": "Optics", "position": {"x": 0.5, "y": 0.5}, "size": 4}]"#,
    )
    .unwrap();
    let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
    let mut controller = MapController::new(Arc::new(provider), MapConfig::default());
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));

    let written = controller
        .export_png(&dir.path().join("map"), 1.0)
        .unwrap();
    assert_eq!(written, dir.path().join("map.png"));
    assert!(written.exists());
}

#[test]
fn test_export_without_data_fails() {
    let mut controller = MapController::new(
        Arc::new(StaticProvider::default()),
        MapConfig::default(),
    );
    controller.reload();
    assert!(controller.wait_for_load(TIMEOUT));
    let dir = tempfile::tempdir().unwrap();
    assert!(controller.export_png(&dir.path().join("map.png"), 1.0).is_err());
}
