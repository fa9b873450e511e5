use cifcache::core::discovery::DEFAULT_FILE_MARKER;
use cifcache::engine::config::{CacheMode, DEFAULT_CHUNK_SIZE};

/// Values used when neither the command line nor the config file sets an option.
pub struct DefaultsConfig {
    pub file_marker: String,
    pub chunk_size: usize,
    pub chains_workers: usize,
    pub entries_workers: usize,
    pub dump_console: bool,
}

impl DefaultsConfig {
    pub fn workers(&self, mode: CacheMode) -> usize {
        match mode {
            CacheMode::Chains => self.chains_workers,
            CacheMode::Entries => self.entries_workers,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            file_marker: DEFAULT_FILE_MARKER.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chains_workers: CacheMode::Chains.default_workers(),
            entries_workers: CacheMode::Entries.default_workers(),
            dump_console: false,
        }
    }
}
