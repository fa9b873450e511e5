use crate::core::models::cache::UNKNOWN_CLUSTER_SIZE;
use crate::engine::error::CacheError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Read-only lookup from a composite `{ENTRY_ID}_{ENTITY_ID}` member key to the
/// size of the cluster that member belongs to.
///
/// The backing file holds one cluster per line with whitespace-separated member
/// tokens. A cluster's size is its token count, and every token is stored
/// upper-cased. When a token appears on several lines the last line wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterIndex {
    sizes: HashMap<String, i64>,
}

impl ClusterIndex {
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let to_err = |source: std::io::Error| CacheError::ClusterFile {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(to_err)?;
        let index = Self::from_reader(BufReader::new(file)).map_err(to_err)?;
        info!(members = index.len(), "Loaded cluster index from {:?}", path);
        Ok(index)
    }

    pub fn from_reader(reader: impl BufRead) -> std::io::Result<Self> {
        let mut index = Self::default();
        for line in reader.lines() {
            index.add_cluster_line(&line?);
        }
        Ok(index)
    }

    pub fn parse_str(content: &str) -> Self {
        let mut index = Self::default();
        for line in content.lines() {
            index.add_cluster_line(line);
        }
        index
    }

    fn add_cluster_line(&mut self, line: &str) {
        let members: Vec<&str> = line.split_whitespace().collect();
        let size = members.len() as i64;
        for member in members {
            if let Some(previous) = self.sizes.insert(member.to_uppercase(), size) {
                if previous != size {
                    debug!(
                        member,
                        previous,
                        size,
                        "Cluster member listed more than once; keeping the later size."
                    );
                }
            }
        }
    }

    /// Returns the cluster size of `key`, or [`UNKNOWN_CLUSTER_SIZE`] when the key
    /// is not a member of any cluster. The key is expected to be upper-cased already.
    pub fn cluster_size(&self, key: &str) -> i64 {
        self.sizes.get(key).copied().unwrap_or(UNKNOWN_CLUSTER_SIZE)
    }

    /// Builds the lookup key for an entity of an entry, upper-casing the entry id.
    pub fn member_key(entry_id: &str, entity_id: &str) -> String {
        format!("{}_{}", entry_id.to_uppercase(), entity_id)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn cluster_size_is_token_count_of_line() {
        let index = ClusterIndex::parse_str("A_1 A_2 A_3\nB_1\n");
        assert_eq!(index.cluster_size("A_1"), 3);
        assert_eq!(index.cluster_size("A_3"), 3);
        assert_eq!(index.cluster_size("B_1"), 1);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn members_are_upper_cased() {
        let index = ClusterIndex::parse_str("1abc_1 2xyz_2\n");
        assert_eq!(index.cluster_size("1ABC_1"), 2);
        assert_eq!(index.cluster_size("1abc_1"), UNKNOWN_CLUSTER_SIZE);
    }

    #[test]
    fn missing_member_returns_sentinel() {
        let index = ClusterIndex::parse_str("A_1 A_2\n");
        assert_eq!(index.cluster_size("C_9"), -1);
    }

    #[test]
    fn later_line_wins_for_duplicate_member() {
        let index = ClusterIndex::parse_str("X_1 Y_1 Z_1\nX_1 W_1\n");
        assert_eq!(index.cluster_size("X_1"), 2);
        assert_eq!(index.cluster_size("Y_1"), 3);
    }

    #[test]
    fn blank_lines_and_extra_whitespace_are_tolerated() {
        let index = ClusterIndex::parse_str("\n   \n\tA_1    A_2 \n\n");
        assert_eq!(index.len(), 2);
        assert_eq!(index.cluster_size("A_2"), 2);
    }

    #[test]
    fn member_key_upper_cases_entry_only() {
        assert_eq!(ClusterIndex::member_key("1abc", "1"), "1ABC_1");
        assert_eq!(ClusterIndex::member_key("1abc", "b"), "1ABC_b");
    }

    #[test]
    fn load_reads_index_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1ABC_1 2XYZ_1 3DEF_2").unwrap();
        writeln!(file, "4GHI_1").unwrap();

        let index = ClusterIndex::load(file.path()).unwrap();

        assert_eq!(index.cluster_size("2XYZ_1"), 3);
        assert_eq!(index.cluster_size("4GHI_1"), 1);
    }

    #[test]
    fn load_returns_cluster_file_error_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClusterIndex::load(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(CacheError::ClusterFile { .. })));
    }

    #[test]
    fn load_rejects_cluster_file_that_is_not_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1ABC_1 2XYZ_1\n\xff\xfe 3DEF_2\n").unwrap();

        let result = ClusterIndex::load(file.path());

        match result {
            Err(CacheError::ClusterFile { path, source }) => {
                assert_eq!(path, file.path());
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("expected cluster file error, got {:?}", other),
        }
    }
}
