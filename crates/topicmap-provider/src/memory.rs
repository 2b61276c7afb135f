use crate::{ClusterProvider, ProviderError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use topicmap_core::{Cluster, ClusterId, ClusterSnapshot, ComparisonResult, EpisodeId, NormalizedPos};

#[derive(Default)]
struct StaticData {
    clusters: Vec<Cluster>,
    comparisons: HashMap<EpisodeId, ComparisonResult>,
    snapshot_error: Option<String>,
}

/// In-memory provider. Data can be swapped at runtime, which the demo viewer
/// and the controller tests use to simulate a changing backend.
#[derive(Default)]
pub struct StaticProvider {
    data: RwLock<StaticData>,
}

impl StaticProvider {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        Self {
            data: RwLock::new(StaticData {
                clusters,
                ..Default::default()
            }),
        }
    }

    pub fn with_comparison(self, result: ComparisonResult) -> Self {
        self.insert_comparison(result);
        self
    }

    pub fn insert_comparison(&self, result: ComparisonResult) {
        self.data
            .write()
            .comparisons
            .insert(result.episode_id.clone(), result);
    }

    pub fn set_clusters(&self, clusters: Vec<Cluster>) {
        self.data.write().clusters = clusters;
    }

    /// Make every subsequent snapshot load fail with `message`; `None` restores it.
    pub fn set_snapshot_error(&self, message: Option<String>) {
        self.data.write().snapshot_error = message;
    }

    /// A small research-topic map used when no data directory is configured.
    pub fn demo() -> Self {
        let clusters = vec![
            Cluster::new(1, "Protein folding", NormalizedPos::new(0.18, 0.22), 48)
                .with_description("Structure prediction and folding dynamics")
                .with_keywords(["alphafold", "structure", "md", "energy landscape"])
                .with_primary_count(31),
            Cluster::new(2, "Gene regulation", NormalizedPos::new(0.42, 0.35), 36)
                .with_description("Transcription factors and enhancer logic")
                .with_keywords(["enhancer", "chromatin", "tf binding"])
                .with_primary_count(20),
            Cluster::new(3, "Single-cell atlases", NormalizedPos::new(0.66, 0.2), 27)
                .with_keywords(["scrna-seq", "atlas", "clustering"])
                .with_primary_count(12),
            Cluster::new(4, "CRISPR screens", NormalizedPos::new(0.3, 0.7), 19)
                .with_keywords(["crispr", "knockout", "screen"])
                .with_primary_count(9),
            Cluster::new(5, "Microbiome", NormalizedPos::new(0.78, 0.62), 14)
                .with_keywords(["16s", "metagenomics", "gut"])
                .with_primary_count(6),
            Cluster::new(6, "Neural coding", NormalizedPos::new(0.55, 0.82), 9)
                .with_keywords(["spikes", "population", "cortex"])
                .with_primary_count(3),
            Cluster::new(7, "Epidemiology", NormalizedPos::new(0.88, 0.4), 4)
                .with_keywords(["cohort", "incidence"])
                .with_primary_count(1),
        ];
        let comparison = ComparisonResult::from_coverage(
            EpisodeId::new("demo-episode"),
            &[ClusterId(1), ClusterId(2), ClusterId(5), ClusterId(7)],
            &[ClusterId(1), ClusterId(2), ClusterId(3), ClusterId(4)],
        );
        Self::new(clusters).with_comparison(comparison)
    }
}

impl ClusterProvider for StaticProvider {
    fn load_cluster_snapshot(&self) -> Result<ClusterSnapshot> {
        let data = self.data.read();
        if let Some(message) = &data.snapshot_error {
            return Err(ProviderError::Unavailable(message.clone()));
        }
        Ok(ClusterSnapshot::new(data.clusters.clone())?)
    }

    fn load_episode_comparison(&self, episode_id: &EpisodeId) -> Result<ComparisonResult> {
        self.data
            .read()
            .comparisons
            .get(episode_id)
            .cloned()
            .ok_or_else(|| ProviderError::ComparisonNotFound(episode_id.clone()))
    }
}
