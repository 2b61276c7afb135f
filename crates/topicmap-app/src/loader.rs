use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use topicmap_core::{ClusterSnapshot, ComparisonResult, EpisodeId};
use topicmap_events::LoadKind;
use topicmap_provider::ClusterProvider;

/// Generation bookkeeping shared between the controller and its loader threads.
#[derive(Debug, Default)]
pub(crate) struct LoadTracker {
    pub latest: u64,
}

pub(crate) type SharedTracker = Arc<Mutex<LoadTracker>>;

#[derive(Debug)]
pub(crate) enum LoadResult {
    /// Snapshot plus, in comparison mode, its comparison. Delivered together.
    Loaded {
        snapshot: ClusterSnapshot,
        comparison: Option<ComparisonResult>,
    },
    Failed {
        kind: LoadKind,
        message: String,
    },
    /// A newer request was issued before this one needed its second fetch.
    Superseded,
}

#[derive(Debug)]
pub(crate) struct LoadOutcome {
    pub generation: u64,
    pub result: LoadResult,
}

pub(crate) struct LoadRequest {
    pub generation: u64,
    /// Set only when the config asks for a comparison.
    pub episode_id: Option<EpisodeId>,
}

/// Run one load on a dedicated thread and post the outcome back.
pub(crate) fn spawn_load(
    provider: Arc<dyn ClusterProvider>,
    tracker: SharedTracker,
    request: LoadRequest,
    outcomes: Sender<LoadOutcome>,
) {
    std::thread::spawn(move || {
        let generation = request.generation;
        let result = run_load(provider.as_ref(), &tracker, request);
        // The controller may already be gone; nothing to report to then.
        let _ = outcomes.send(LoadOutcome { generation, result });
    });
}

fn run_load(
    provider: &dyn ClusterProvider,
    tracker: &Mutex<LoadTracker>,
    request: LoadRequest,
) -> LoadResult {
    let snapshot = match provider.load_cluster_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return LoadResult::Failed {
                kind: LoadKind::Snapshot,
                message: e.to_string(),
            };
        }
    };

    let Some(episode_id) = request.episode_id else {
        return LoadResult::Loaded {
            snapshot,
            comparison: None,
        };
    };

    if tracker.lock().latest != request.generation {
        return LoadResult::Superseded;
    }

    match provider.load_episode_comparison(&episode_id) {
        Ok(comparison) => LoadResult::Loaded {
            snapshot,
            comparison: Some(comparison),
        },
        Err(e) => LoadResult::Failed {
            kind: LoadKind::Comparison,
            message: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topicmap_core::{Cluster, ClusterId, NormalizedPos};
    use topicmap_provider::StaticProvider;

    fn provider() -> StaticProvider {
        StaticProvider::new(vec![Cluster::new(1, "a", NormalizedPos::default(), 3)]).with_comparison(
            ComparisonResult::from_coverage(EpisodeId::new("ep"), &[ClusterId(1)], &[]),
        )
    }

    #[test]
    fn test_snapshot_only_without_episode() {
        let tracker = Mutex::new(LoadTracker { latest: 1 });
        let result = run_load(
            &provider(),
            &tracker,
            LoadRequest {
                generation: 1,
                episode_id: None,
            },
        );
        assert!(matches!(
            result,
            LoadResult::Loaded {
                comparison: None,
                ..
            }
        ));
    }

    #[test]
    fn test_comparison_delivered_with_snapshot() {
        let tracker = Mutex::new(LoadTracker { latest: 1 });
        let result = run_load(
            &provider(),
            &tracker,
            LoadRequest {
                generation: 1,
                episode_id: Some(EpisodeId::new("ep")),
            },
        );
        match result {
            LoadResult::Loaded {
                snapshot,
                comparison: Some(comparison),
            } => {
                assert_eq!(snapshot.len(), 1);
                assert_eq!(comparison.episode_id, EpisodeId::new("ep"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_superseded_request_skips_comparison() {
        let tracker = Mutex::new(LoadTracker { latest: 2 });
        let result = run_load(
            &provider(),
            &tracker,
            LoadRequest {
                generation: 1,
                episode_id: Some(EpisodeId::new("ep")),
            },
        );
        assert!(matches!(result, LoadResult::Superseded));
    }

    #[test]
    fn test_missing_comparison_fails_whole_load() {
        let tracker = Mutex::new(LoadTracker { latest: 1 });
        let result = run_load(
            &provider(),
            &tracker,
            LoadRequest {
                generation: 1,
                episode_id: Some(EpisodeId::new("unknown")),
            },
        );
        assert!(matches!(
            result,
            LoadResult::Failed {
                kind: LoadKind::Comparison,
                ..
            }
        ));
    }
}
