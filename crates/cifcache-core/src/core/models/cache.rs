use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cluster size recorded for a chain whose entity is absent from a present cluster index.
pub const UNKNOWN_CLUSTER_SIZE: i64 = -1;

/// Per-chain cache value, keyed by `{ENTRY_ID}_{CHAIN_ID}`.
///
/// `cluster_size` is only serialized when a cluster index was supplied for the
/// run; without one the field is absent rather than `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCacheEntry {
    pub release_date: String,
    pub seq: String,
    pub resolution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_size: Option<i64>,
}

/// Per-entry cache value, keyed by `{ENTRY_ID}`.
///
/// `chain_ids` and `seqs` are parallel lists in the order the structure declares
/// its chains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCacheEntry {
    pub release_date: String,
    pub chain_ids: Vec<String>,
    pub seqs: Vec<String>,
    pub no_chains: usize,
    pub resolution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheEntry {
    Chain(ChainCacheEntry),
    Entry(EntryCacheEntry),
}

impl From<ChainCacheEntry> for CacheEntry {
    fn from(entry: ChainCacheEntry) -> Self {
        CacheEntry::Chain(entry)
    }
}

impl From<EntryCacheEntry> for CacheEntry {
    fn from(entry: EntryCacheEntry) -> Self {
        CacheEntry::Entry(entry)
    }
}

/// The aggregated cache. Backed by a `BTreeMap` so serialization order is the
/// lexicographic key order regardless of the order in which files completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl FinalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning the value it replaced on a key collision.
    pub fn insert(&mut self, key: String, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key, entry)
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
