use crate::core::clusters::ClusterIndex;
use crate::core::models::cache::{
    CacheEntry, ChainCacheEntry, EntryCacheEntry, UNKNOWN_CLUSTER_SIZE,
};
use crate::core::models::record::StructureRecord;

/// Turns one parsed structure into the `(key, entry)` pairs it contributes to a
/// cache. Projectors are shared read-only by all parse workers.
pub trait RecordProjector: Send + Sync {
    fn project(&self, record: &StructureRecord) -> Vec<(String, CacheEntry)>;
}

/// Produces one [`ChainCacheEntry`] per chain.
///
/// With a cluster index every entry carries a `cluster_size` (the
/// [`UNKNOWN_CLUSTER_SIZE`] sentinel on a lookup miss); without one the field is
/// left out entirely.
#[derive(Debug, Clone, Default)]
pub struct ChainProjector {
    clusters: Option<ClusterIndex>,
}

impl ChainProjector {
    pub fn new(clusters: Option<ClusterIndex>) -> Self {
        Self { clusters }
    }

    fn cluster_size(&self, record: &StructureRecord, chain_id: &str) -> Option<i64> {
        let index = self.clusters.as_ref()?;
        let size = match record.entity_id(chain_id) {
            Some(entity_id) => {
                index.cluster_size(&ClusterIndex::member_key(&record.file_id, entity_id))
            }
            None => UNKNOWN_CLUSTER_SIZE,
        };
        Some(size)
    }
}

impl RecordProjector for ChainProjector {
    fn project(&self, record: &StructureRecord) -> Vec<(String, CacheEntry)> {
        record
            .chains()
            .map(|(chain_id, seq)| {
                let entry = ChainCacheEntry {
                    release_date: record.header.release_date.clone(),
                    seq: seq.to_string(),
                    resolution: record.header.resolution,
                    cluster_size: self.cluster_size(record, chain_id),
                };
                (format!("{}_{}", record.file_id, chain_id), entry.into())
            })
            .collect()
    }
}

/// Produces exactly one [`EntryCacheEntry`] per structure. Never consults a
/// cluster index.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryProjector;

impl RecordProjector for EntryProjector {
    fn project(&self, record: &StructureRecord) -> Vec<(String, CacheEntry)> {
        let (chain_ids, seqs): (Vec<String>, Vec<String>) = record
            .chains()
            .map(|(chain_id, seq)| (chain_id.to_string(), seq.to_string()))
            .unzip();

        let entry = EntryCacheEntry {
            release_date: record.header.release_date.clone(),
            no_chains: chain_ids.len(),
            chain_ids,
            seqs,
            resolution: record.header.resolution,
        };
        vec![(record.file_id.clone(), entry.into())]
    }
}
