use crate::core::discovery::DEFAULT_FILE_MARKER;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_CHUNK_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

/// Which aggregation schema a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// One entry per chain, keyed `{ENTRY_ID}_{CHAIN_ID}`.
    Chains,
    /// One entry per structure file, keyed `{ENTRY_ID}`.
    Entries,
}

impl CacheMode {
    /// Worker count used when none is configured. The two modes have always
    /// shipped with different defaults.
    pub fn default_workers(self) -> usize {
        match self {
            CacheMode::Chains => 0,
            CacheMode::Entries => 4,
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMode::Chains => write!(f, "chain-level"),
            CacheMode::Entries => write!(f, "entry-level"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Number of parse threads; `0` parses sequentially on the calling thread.
    pub workers: usize,
    /// Number of files handed to a worker at a time.
    pub chunk_size: usize,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub mode: CacheMode,
    pub pool: PoolOptions,
    pub file_marker: String,
    pub cluster_file: Option<PathBuf>,
    pub dump_console: bool,
}

#[derive(Default)]
pub struct BuildConfigBuilder {
    input_dir: Option<PathBuf>,
    output_path: Option<PathBuf>,
    mode: Option<CacheMode>,
    workers: Option<usize>,
    chunk_size: Option<usize>,
    file_marker: Option<String>,
    cluster_file: Option<PathBuf>,
    dump_console: bool,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_dir(mut self, path: PathBuf) -> Self {
        self.input_dir = Some(path);
        self
    }
    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }
    pub fn mode(mut self, mode: CacheMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
    pub fn file_marker(mut self, marker: impl Into<String>) -> Self {
        self.file_marker = Some(marker.into());
        self
    }
    pub fn cluster_file(mut self, path: Option<PathBuf>) -> Self {
        self.cluster_file = path;
        self
    }
    pub fn dump_console(mut self, enabled: bool) -> Self {
        self.dump_console = enabled;
        self
    }

    pub fn build(self) -> Result<BuildConfig, ConfigError> {
        let mode = self.mode.ok_or(ConfigError::MissingParameter("mode"))?;

        let chunk_size = self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }

        let file_marker = self
            .file_marker
            .unwrap_or_else(|| DEFAULT_FILE_MARKER.to_string());
        if file_marker.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "file_marker",
                reason: "must not be empty".to_string(),
            });
        }

        if mode == CacheMode::Entries && self.cluster_file.is_some() {
            return Err(ConfigError::InvalidParameter {
                parameter: "cluster_file",
                reason: "cluster sizes are only recorded in chain-level caches".to_string(),
            });
        }

        Ok(BuildConfig {
            input_dir: self
                .input_dir
                .ok_or(ConfigError::MissingParameter("input_dir"))?,
            output_path: self
                .output_path
                .ok_or(ConfigError::MissingParameter("output_path"))?,
            mode,
            pool: PoolOptions {
                workers: self.workers.unwrap_or(mode.default_workers()),
                chunk_size,
            },
            file_marker,
            cluster_file: self.cluster_file,
            dump_console: self.dump_console,
        })
    }
}
