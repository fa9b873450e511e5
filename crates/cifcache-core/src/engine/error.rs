use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;

/// Fatal errors of a cache build. Any of these aborts the run before an output
/// file is produced; per-file parse problems are never reported through this type.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Input directory not found or not readable: '{path}': {source}", path = path.display())]
    DirectoryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cluster file '{path}': {source}", path = path.display())]
    ClusterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build worker pool with {workers} thread(s): {reason}")]
    WorkerPool { workers: usize, reason: String },

    #[error("Failed to serialize cache: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write cache to '{path}': {source}", path = path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
