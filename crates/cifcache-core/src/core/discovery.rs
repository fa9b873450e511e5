use crate::engine::error::CacheError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Marker substring identifying mmCIF files, compressed or not.
pub const DEFAULT_FILE_MARKER: &str = ".cif";

const GZIP_SUFFIX: &str = ".gz";

/// A structure file selected for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub file_name: String,
    /// File name up to the first `.`, with case preserved (`1abc.cif.gz` -> `1abc`).
    pub entry_id: String,
    pub compressed: bool,
}

impl CandidateFile {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        let entry_id = file_name
            .split('.')
            .next()
            .unwrap_or(file_name)
            .to_string();
        Self {
            path: dir.join(file_name),
            file_name: file_name.to_string(),
            entry_id,
            compressed: file_name.ends_with(GZIP_SUFFIX),
        }
    }
}

/// Lists the files of `input_dir` whose names contain `marker`, in directory
/// listing order. Subdirectories and non-matching names are skipped silently;
/// files are not opened here, so unreadable files surface later as parse failures.
pub fn discover(input_dir: &Path, marker: &str) -> Result<Vec<CandidateFile>, CacheError> {
    let not_found = |source: std::io::Error| CacheError::DirectoryNotFound {
        path: input_dir.to_path_buf(),
        source,
    };

    let mut candidates = Vec::new();
    for dir_entry in fs::read_dir(input_dir).map_err(not_found)? {
        let dir_entry = dir_entry.map_err(not_found)?;

        let Some(file_name) = dir_entry.file_name().to_str().map(str::to_owned) else {
            debug!(name = ?dir_entry.file_name(), "Skipping non UTF-8 file name.");
            continue;
        };
        if !file_name.contains(marker) {
            trace!("Skipping '{}': no '{}' marker.", file_name, marker);
            continue;
        }
        if dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            trace!("Skipping directory '{}'.", file_name);
            continue;
        }

        candidates.push(CandidateFile::new(input_dir, &file_name));
    }

    debug!(
        "Discovered {} candidate file(s) in {:?}",
        candidates.len(),
        input_dir
    );
    Ok(candidates)
}
