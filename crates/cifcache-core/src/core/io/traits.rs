use crate::core::models::record::StructureRecord;

/// Result of handing one file's contents to a [`StructureParser`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// The file was understood and reduced to a structure record.
    Parsed(StructureRecord),
    /// The parser declined the file. Rejections are deterministic for a given
    /// input, so callers skip the file instead of retrying it.
    Rejected { reason: String },
}

impl ParsedRecord {
    pub fn rejected(reason: impl Into<String>) -> Self {
        ParsedRecord::Rejected {
            reason: reason.into(),
        }
    }
}

/// Defines the interface between the cache pipeline and a structure file parser.
///
/// Implementors are shared by every worker of the parse pool, hence the
/// `Send + Sync` bound; they must not hold mutable state across calls.
pub trait StructureParser: Send + Sync {
    /// Parses the full text of one structure file.
    ///
    /// # Arguments
    ///
    /// * `file_id` - The entry identifier derived from the file name.
    /// * `contents` - The decompressed file contents.
    ///
    /// # Return
    ///
    /// Returns [`ParsedRecord::Parsed`] on success and [`ParsedRecord::Rejected`]
    /// for any input the parser cannot make sense of.
    fn parse(&self, file_id: &str, contents: &str) -> ParsedRecord;
}

impl<F> StructureParser for F
where
    F: Fn(&str, &str) -> ParsedRecord + Send + Sync,
{
    fn parse(&self, file_id: &str, contents: &str) -> ParsedRecord {
        self(file_id, contents)
    }
}
