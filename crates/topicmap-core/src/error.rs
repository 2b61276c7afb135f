use crate::ClusterId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Duplicate cluster id in snapshot: {0}")]
    DuplicateClusterId(ClusterId),
    #[error("Invalid highlight mode: {0:?} (expected none, episode, notebook or comparison)")]
    InvalidHighlightMode(String),
}
