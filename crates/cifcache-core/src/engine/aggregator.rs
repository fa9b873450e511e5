use super::pool::ParseOutcome;
use crate::core::models::cache::FinalCache;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Counters describing a finished (or in-progress) build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Files that have reported an outcome, whatever it was.
    pub completed: u64,
    pub succeeded: u64,
    pub soft_failed: u64,
    pub failed: u64,
    /// Keys that replaced an entry already present in the cache.
    pub overwritten: u64,
    /// Entries in the final cache.
    pub entries: usize,
}

/// Sole owner of the [`FinalCache`] while a build is running. Outcomes are merged
/// one at a time in completion order; on a key collision the later outcome wins.
#[derive(Debug, Default)]
pub struct Aggregator {
    cache: FinalCache,
    summary: BuildSummary,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one outcome and returns the number of files completed so far.
    pub fn merge(&mut self, outcome: ParseOutcome) -> u64 {
        self.summary.completed += 1;

        match outcome {
            ParseOutcome::Success { file_name, entries } => {
                self.summary.succeeded += 1;
                debug!("Merging {} cache entries from '{}'.", entries.len(), file_name);
                for (key, entry) in entries {
                    if self.cache.insert(key.clone(), entry).is_some() {
                        self.summary.overwritten += 1;
                        warn!(
                            "Cache key '{}' was produced again by '{}'; keeping the later entry.",
                            key, file_name
                        );
                    }
                }
            }
            ParseOutcome::SoftFailure { file_name, reason } => {
                self.summary.soft_failed += 1;
                info!("Could not parse {}. Skipping...", file_name);
                debug!(file = %file_name, %reason, "Parser rejection details.");
            }
            ParseOutcome::Failed { file_name, error } => {
                self.summary.failed += 1;
                error!("Failed to process {}: {}. Skipping...", file_name, error);
            }
        }

        self.summary.completed
    }

    pub fn completed(&self) -> u64 {
        self.summary.completed
    }

    pub fn cache(&self) -> &FinalCache {
        &self.cache
    }

    pub fn finish(self) -> (FinalCache, BuildSummary) {
        let mut summary = self.summary;
        summary.entries = self.cache.len();
        (self.cache, summary)
    }
}
