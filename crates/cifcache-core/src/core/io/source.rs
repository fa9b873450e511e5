use crate::core::discovery::CandidateFile;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};

/// Reads the full text of a candidate file, decompressing it when the file name
/// carries a gzip suffix.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened, is not valid gzip while
/// named as such, or does not decode to UTF-8.
pub fn read_structure(candidate: &CandidateFile) -> io::Result<String> {
    let file = File::open(&candidate.path)?;
    let mut contents = String::new();
    if candidate.compressed {
        MultiGzDecoder::new(BufReader::new(file)).read_to_string(&mut contents)?;
    } else {
        BufReader::new(file).read_to_string(&mut contents)?;
    }
    Ok(contents)
}
