use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileChainsConfig {
    pub no_workers: Option<usize>,
    pub chunksize: Option<usize>,
    pub cluster_file: Option<PathBuf>,
    pub dump_console: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileEntriesConfig {
    pub no_workers: Option<usize>,
    pub chunksize: Option<usize>,
}

/// Optional TOML defaults file. Every key may be omitted.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub file_marker: Option<String>,
    pub chains: Option<FileChainsConfig>,
    pub entries: Option<FileEntriesConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.resolve_relative_paths(path.parent().unwrap_or(Path::new("")));
        Ok(config)
    }

    /// Cluster file paths in the config file are relative to the config file itself.
    fn resolve_relative_paths(&mut self, base: &Path) {
        if let Some(cluster_file) = self
            .chains
            .as_mut()
            .and_then(|chains| chains.cluster_file.as_mut())
        {
            if cluster_file.is_relative() {
                *cluster_file = base.join(&*cluster_file);
            }
        }
    }
}
