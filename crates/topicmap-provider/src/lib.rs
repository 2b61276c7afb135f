//! Cluster data provider seam.
//!
//! The map never fetches data itself; it calls a `ClusterProvider`. Retry and
//! timeout policy belong to the provider implementation.

use std::path::PathBuf;
use thiserror::Error;
use topicmap_core::{ClusterSnapshot, ComparisonResult, CoreError, EpisodeId};

pub mod json;
pub mod memory;

pub use json::{JsonFileProvider, ProviderConfig};
pub use memory::StaticProvider;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid snapshot: {0}")]
    Core(#[from] CoreError),
    #[error("No comparison data for episode {0}")]
    ComparisonNotFound(EpisodeId),
    #[error("Invalid episode id: {0:?}")]
    InvalidEpisodeId(String),
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

pub trait ClusterProvider: Send + Sync {
    /// The full cluster set. Fails as a whole; never returns partial data.
    fn load_cluster_snapshot(&self) -> Result<ClusterSnapshot>;

    /// Per-cluster membership for one episode against the notebook.
    fn load_episode_comparison(&self, episode_id: &EpisodeId) -> Result<ComparisonResult>;
}
