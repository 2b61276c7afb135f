use crate::{ClusterProvider, ProviderError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use topicmap_core::{Cluster, ClusterId, ClusterMembership, ClusterSnapshot, ComparisonResult, EpisodeId};

pub const SNAPSHOT_FILE: &str = "clusters.json";
pub const COMPARISONS_DIR: &str = "comparisons";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Directory holding `clusters.json` and `comparisons/<episode>.json`.
    pub data_dir: PathBuf,
}

impl ProviderConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn comparison_path(&self, episode_id: &EpisodeId) -> Result<PathBuf> {
        let raw = episode_id.as_str();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !raw.starts_with('.');
        if !valid {
            return Err(ProviderError::InvalidEpisodeId(raw.to_string()));
        }
        Ok(self
            .data_dir
            .join(COMPARISONS_DIR)
            .join(format!("{raw}.json")))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List(Vec<Cluster>),
    Wrapped { clusters: Vec<Cluster> },
}

/// Either explicit per-cluster flags or the two raw coverage sets. Unknown keys
/// are rejected so a misspelled file fails the load instead of reading as empty.
#[derive(Deserialize)]
#[serde(untagged)]
enum ComparisonFile {
    Memberships(MembershipsFile),
    Coverage(CoverageFile),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MembershipsFile {
    memberships: Vec<ClusterMembership>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CoverageFile {
    episode_clusters: Vec<ClusterId>,
    #[serde(default)]
    notebook_clusters: Vec<ClusterId>,
}

/// Reads clusters and comparisons from JSON files in a data directory.
pub struct JsonFileProvider {
    config: ProviderConfig,
}

impl JsonFileProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ProviderError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl ClusterProvider for JsonFileProvider {
    fn load_cluster_snapshot(&self) -> Result<ClusterSnapshot> {
        let path = self.config.snapshot_path();
        tracing::debug!("Loading cluster snapshot from {:?}", path);
        let clusters = match read_json::<SnapshotFile>(&path)? {
            SnapshotFile::List(clusters) => clusters,
            SnapshotFile::Wrapped { clusters } => clusters,
        };
        Ok(ClusterSnapshot::new(clusters)?)
    }

    fn load_episode_comparison(&self, episode_id: &EpisodeId) -> Result<ComparisonResult> {
        let path = self.config.comparison_path(episode_id)?;
        if !path.exists() {
            return Err(ProviderError::ComparisonNotFound(episode_id.clone()));
        }
        tracing::debug!("Loading comparison for {} from {:?}", episode_id, path);
        let result = match read_json::<ComparisonFile>(&path)? {
            ComparisonFile::Memberships(file) => {
                ComparisonResult::new(episode_id.clone(), file.memberships)
            }
            ComparisonFile::Coverage(file) => ComparisonResult::from_coverage(
                episode_id.clone(),
                &file.episode_clusters,
                &file.notebook_clusters,
            ),
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_plain_list_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SNAPSHOT_FILE,
            r#"[
                {"id": 1, "label": "Optics", "position": {"x": 0.1, "y": 0.2}, "size": 12},
                {"id": 2, "label": "Lasers", "position": {"x": 0.6, "y": 0.4}, "size": 3,
                 "keywords": ["laser", "cavity"], "primary_count": 2}
            ]"#,
        );
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
        let snapshot = provider.load_cluster_snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.clusters()[1].keywords, vec!["laser", "cavity"]);
    }

    #[test]
    fn test_load_wrapped_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SNAPSHOT_FILE,
            r#"{"clusters": [{"id": 5, "label": "X", "position": {"x": 0.5, "y": 0.5}}]}"#,
        );
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
        assert_eq!(provider.load_cluster_snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_and_malformed_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
        assert!(matches!(
            provider.load_cluster_snapshot(),
            Err(ProviderError::Io { .. })
        ));

        write(dir.path(), SNAPSHOT_FILE, "{not json");
        assert!(matches!(
            provider.load_cluster_snapshot(),
            Err(ProviderError::Json { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            SNAPSHOT_FILE,
            r#"[{"id": 1, "label": "a", "position": {"x": 0, "y": 0}},
                {"id": 1, "label": "b", "position": {"x": 1, "y": 1}}]"#,
        );
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
        assert!(matches!(
            provider.load_cluster_snapshot(),
            Err(ProviderError::Core(_))
        ));
    }

    #[test]
    fn test_comparison_formats() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "comparisons/ep-1.json",
            r#"{"episode_clusters": [1, 2, 3], "notebook_clusters": [2, 3, 4]}"#,
        );
        write(
            dir.path(),
            "comparisons/ep-2.json",
            r#"{"memberships": [{"cluster_id": 9, "in_episode": true}]}"#,
        );
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));

        let coverage = provider
            .load_episode_comparison(&EpisodeId::new("ep-1"))
            .unwrap();
        assert_eq!(coverage.memberships.len(), 4);
        assert_eq!(coverage.episode_id, EpisodeId::new("ep-1"));

        let explicit = provider
            .load_episode_comparison(&EpisodeId::new("ep-2"))
            .unwrap();
        assert_eq!(explicit.memberships.len(), 1);
        assert!(!explicit.memberships[0].in_notebook);

        assert!(matches!(
            provider.load_episode_comparison(&EpisodeId::new("ep-3")),
            Err(ProviderError::ComparisonNotFound(_))
        ));
    }

    #[test]
    fn test_unrecognized_comparison_keys_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "comparisons/ep-1.json",
            r#"{"episodeClusters": [1, 2, 3], "notebookClusters": [2, 3, 4]}"#,
        );
        write(dir.path(), "comparisons/ep-2.json", "{}");
        write(
            dir.path(),
            "comparisons/ep-3.json",
            r#"{"episode_clusters": [1], "notebook_cluster": [2]}"#,
        );
        let provider = JsonFileProvider::new(ProviderConfig::new(dir.path()));
        for episode in ["ep-1", "ep-2", "ep-3"] {
            assert!(
                matches!(
                    provider.load_episode_comparison(&EpisodeId::new(episode)),
                    Err(ProviderError::Json { .. })
                ),
                "{episode} should be rejected"
            );
        }
    }

    #[test]
    fn test_episode_id_cannot_escape_data_dir() {
        let config = ProviderConfig::new("/data");
        for bad in ["../secrets", "a/b", "", ".hidden"] {
            assert!(matches!(
                config.comparison_path(&EpisodeId::new(bad)),
                Err(ProviderError::InvalidEpisodeId(_))
            ));
        }
        assert!(config.comparison_path(&EpisodeId::new("ep_7.v2")).is_ok());
    }
}
