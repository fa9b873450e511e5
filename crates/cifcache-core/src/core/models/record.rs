use std::collections::HashMap;

/// Header-level metadata of a parsed structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureHeader {
    /// Earliest revision date, formatted as in the source file (`YYYY-MM-DD`).
    pub release_date: String,
    /// High resolution limit in Angstroms, `0.0` when the file reports none.
    pub resolution: f64,
    /// Lower-cased experimental methods (e.g. `x-ray diffraction`).
    pub structure_method: Vec<String>,
}

/// A successfully parsed structure file, reduced to what cache generation needs.
///
/// Chains are keyed by their author chain identifier and kept in the order in
/// which the file declares them, so that entry-level caches list chains and
/// sequences deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub file_id: String,
    pub header: StructureHeader,
    chain_to_seqres: Vec<(String, String)>,
    author_to_entity_id: HashMap<String, String>,
}

impl StructureRecord {
    pub fn new(file_id: impl Into<String>, header: StructureHeader) -> Self {
        Self {
            file_id: file_id.into(),
            header,
            chain_to_seqres: Vec::new(),
            author_to_entity_id: HashMap::new(),
        }
    }

    /// Adds (or replaces in place) the sequence and owning entity of an author chain.
    pub fn insert_chain(
        &mut self,
        chain_id: impl Into<String>,
        entity_id: impl Into<String>,
        sequence: impl Into<String>,
    ) {
        let chain_id = chain_id.into();
        let sequence = sequence.into();
        match self
            .chain_to_seqres
            .iter_mut()
            .find(|(existing, _)| *existing == chain_id)
        {
            Some((_, seq)) => *seq = sequence,
            None => self.chain_to_seqres.push((chain_id.clone(), sequence)),
        }
        self.author_to_entity_id.insert(chain_id, entity_id.into());
    }

    pub fn chains(&self) -> impl Iterator<Item = (&str, &str)> {
        self.chain_to_seqres
            .iter()
            .map(|(chain, seq)| (chain.as_str(), seq.as_str()))
    }

    pub fn entity_id(&self, chain_id: &str) -> Option<&str> {
        self.author_to_entity_id.get(chain_id).map(String::as_str)
    }
}
