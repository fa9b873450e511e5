use super::traits::{ParsedRecord, StructureParser};
use crate::core::models::record::{StructureHeader, StructureRecord};
use crate::core::utils::residues::sequence_from_monomers;
use phf::{Set, phf_set};
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

const RELEASE_DATE_TAG: &str = "_pdbx_audit_revision_history.revision_date";
const EXPTL_METHOD_TAG: &str = "_exptl.method";
const RESOLUTION_TAGS: [&str; 3] = [
    "_refine.ls_d_res_high",
    "_em_3d_reconstruction.resolution",
    "_reflns.d_resolution_high",
];

/// Tags consulted when building a [`StructureRecord`]. Everything else, notably
/// atom coordinates, is tokenized but never copied out of the input text.
static RETAINED_TAGS: Set<&'static str> = phf_set! {
    "_pdbx_audit_revision_history.revision_date",
    "_refine.ls_d_res_high",
    "_em_3d_reconstruction.resolution",
    "_reflns.d_resolution_high",
    "_exptl.method",
    "_chem_comp.id",
    "_chem_comp.type",
    "_entity_poly_seq.entity_id",
    "_entity_poly_seq.mon_id",
    "_struct_asym.id",
    "_struct_asym.entity_id",
    "_atom_site.label_asym_id",
    "_atom_site.auth_asym_id",
    "_atom_site.pdbx_PDB_model_num",
    "_pdbx_poly_seq_scheme.asym_id",
    "_pdbx_poly_seq_scheme.pdb_strand_id",
};

fn is_retained_tag(tag: &str) -> bool {
    RETAINED_TAGS.contains(tag)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MmcifError {
    #[error("No data block found")]
    MissingDataBlock,
    #[error("Unterminated text field starting on line {line}")]
    UnterminatedTextField { line: usize },
    #[error("Unterminated quoted value on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Tag '{tag}' on line {line} has no value")]
    MissingValue { tag: String, line: usize },
    #[error("Loop on line {line} declares no columns")]
    EmptyLoop { line: usize },
    #[error("Loop on line {line} has {values} value(s) for {columns} column(s)")]
    RaggedLoop {
        line: usize,
        columns: usize,
        values: usize,
    },
    #[error("Unexpected value '{value}' on line {line}")]
    UnexpectedValue { value: String, line: usize },
    #[error("Column '{tag}' has {found} value(s), expected {expected}")]
    InconsistentColumns {
        tag: String,
        expected: usize,
        found: usize,
    },
    #[error("Missing release date (_pdbx_audit_revision_history.revision_date)")]
    MissingReleaseDate,
    #[error("No protein chains found in this file.")]
    NoProteinChains,
    #[error("No author chain id found for chain '{0}'")]
    MissingAuthorChain(String),
}

/// Tokens borrow from the document; only multi-line text fields are owned.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    DataBlock(&'a str),
    Loop,
    Tag(&'a str),
    Value(Cow<'a, str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Spanned<'a> {
    token: Token<'a>,
    line: usize,
}

fn is_null(value: &str) -> bool {
    value == "?" || value == "."
}

fn classify_word(word: &str) -> Option<Token<'_>> {
    let lower = word.to_ascii_lowercase();
    if lower.starts_with("data_") {
        Some(Token::DataBlock(&word[5..]))
    } else if lower == "loop_" {
        Some(Token::Loop)
    } else if lower.starts_with("save_") || lower.starts_with("global_") || lower == "stop_" {
        None
    } else if word.starts_with('_') {
        Some(Token::Tag(word))
    } else {
        Some(Token::Value(Cow::Borrowed(word)))
    }
}

fn tokenize_line<'a>(
    line: &'a str,
    line_no: usize,
    out: &mut Vec<Spanned<'a>>,
) -> Result<(), MmcifError> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if c == b'#' {
            break;
        }
        if c == b'\'' || c == b'"' {
            // A quote only closes when followed by whitespace or the end of line.
            let mut j = i + 1;
            loop {
                if j >= bytes.len() {
                    return Err(MmcifError::UnterminatedQuote { line: line_no });
                }
                if bytes[j] == c && (j + 1 == bytes.len() || bytes[j + 1].is_ascii_whitespace()) {
                    break;
                }
                j += 1;
            }
            out.push(Spanned {
                token: Token::Value(Cow::Borrowed(&line[i + 1..j])),
                line: line_no,
            });
            i = j + 1;
        } else {
            let start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if let Some(token) = classify_word(&line[start..i]) {
                out.push(Spanned {
                    token,
                    line: line_no,
                });
            }
        }
    }
    Ok(())
}

fn tokenize(text: &str) -> Result<Vec<Spanned<'_>>, MmcifError> {
    let mut tokens = Vec::new();
    let mut lines = text.lines().enumerate();
    while let Some((idx, line)) = lines.next() {
        let line_no = idx + 1;
        let Some(first) = line.strip_prefix(';') else {
            tokenize_line(line, line_no, &mut tokens)?;
            continue;
        };

        let mut field = vec![first];
        let mut closing = None;
        for (next_idx, next) in lines.by_ref() {
            if let Some(rest) = next.strip_prefix(';') {
                closing = Some((next_idx + 1, rest));
                break;
            }
            field.push(next);
        }
        let Some((closing_no, rest)) = closing else {
            return Err(MmcifError::UnterminatedTextField { line: line_no });
        };
        tokens.push(Spanned {
            token: Token::Value(Cow::Owned(field.join("\n"))),
            line: line_no,
        });
        tokenize_line(rest, closing_no, &mut tokens)?;
    }
    Ok(tokens)
}

/// The first data block of a CIF document, flattened into a tag -> values map in
/// the manner of a PDBx dictionary: single items hold one value, loop columns
/// hold one value per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CifBlock {
    pub name: String,
    items: HashMap<String, Vec<String>>,
}

impl CifBlock {
    pub fn parse(text: &str) -> Result<Self, MmcifError> {
        Self::parse_with(text, |_| true)
    }

    /// Parses the first data block, keeping only tags accepted by `retain`.
    pub fn parse_with(text: &str, retain: impl Fn(&str) -> bool) -> Result<Self, MmcifError> {
        let mut tokens = tokenize(text)?.into_iter().peekable();

        let name = loop {
            match tokens.next() {
                Some(Spanned {
                    token: Token::DataBlock(name),
                    ..
                }) => break name.to_string(),
                Some(Spanned {
                    token: Token::Value(value),
                    line,
                }) => {
                    return Err(MmcifError::UnexpectedValue {
                        value: value.into_owned(),
                        line,
                    });
                }
                Some(_) => continue,
                None => return Err(MmcifError::MissingDataBlock),
            }
        };
        let mut block = CifBlock {
            name,
            items: HashMap::new(),
        };

        while let Some(Spanned { token, line }) = tokens.next() {
            match token {
                Token::DataBlock(_) => break,
                Token::Tag(tag) => match tokens.next() {
                    Some(Spanned {
                        token: Token::Value(value),
                        ..
                    }) => {
                        if retain(tag) {
                            block
                                .items
                                .entry(tag.to_string())
                                .or_default()
                                .push(value.into_owned());
                        }
                    }
                    _ => {
                        return Err(MmcifError::MissingValue {
                            tag: tag.to_string(),
                            line,
                        });
                    }
                },
                Token::Loop => {
                    let mut columns = Vec::new();
                    while let Some(Spanned {
                        token: Token::Tag(tag),
                        ..
                    }) = tokens.next_if(|s| matches!(s.token, Token::Tag(_)))
                    {
                        columns.push(tag);
                    }
                    if columns.is_empty() {
                        return Err(MmcifError::EmptyLoop { line });
                    }

                    let keep: Vec<bool> = columns.iter().map(|c| retain(c)).collect();
                    for (column, keep) in columns.iter().zip(&keep) {
                        if *keep {
                            block.items.entry(column.to_string()).or_default();
                        }
                    }

                    let mut count = 0;
                    while let Some(Spanned {
                        token: Token::Value(value),
                        ..
                    }) = tokens.next_if(|s| matches!(s.token, Token::Value(_)))
                    {
                        let col = count % columns.len();
                        if keep[col] {
                            if let Some(column) = block.items.get_mut(columns[col]) {
                                column.push(value.into_owned());
                            }
                        }
                        count += 1;
                    }
                    if count % columns.len() != 0 {
                        return Err(MmcifError::RaggedLoop {
                            line,
                            columns: columns.len(),
                            values: count,
                        });
                    }
                }
                Token::Value(value) => {
                    return Err(MmcifError::UnexpectedValue {
                        value: value.into_owned(),
                        line,
                    });
                }
            }
        }

        Ok(block)
    }

    pub fn values(&self, tag: &str) -> Option<&[String]> {
        self.items.get(tag).map(Vec::as_slice)
    }

    pub fn first(&self, tag: &str) -> Option<&str> {
        self.values(tag)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Zips the given columns into rows. Returns `Ok(None)` when any column is
    /// absent and an error when the columns differ in length.
    pub fn table<const N: usize>(
        &self,
        tags: [&str; N],
    ) -> Result<Option<Vec<[&str; N]>>, MmcifError> {
        let mut columns = Vec::with_capacity(N);
        for tag in tags {
            match self.items.get(tag) {
                Some(column) => columns.push(column),
                None => return Ok(None),
            }
        }

        let rows = columns.first().map_or(0, |c| c.len());
        if let Some((tag, column)) = tags
            .iter()
            .zip(&columns)
            .find(|(_, column)| column.len() != rows)
        {
            return Err(MmcifError::InconsistentColumns {
                tag: tag.to_string(),
                expected: rows,
                found: column.len(),
            });
        }

        Ok(Some(
            (0..rows)
                .map(|row| std::array::from_fn(|col| columns[col][row].as_str()))
                .collect(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ProteinChain<'a> {
    label_id: &'a str,
    entity_id: &'a str,
    monomers: Vec<&'a str>,
}

fn parse_header(block: &CifBlock) -> Result<StructureHeader, MmcifError> {
    let release_date = block
        .values(RELEASE_DATE_TAG)
        .unwrap_or_default()
        .iter()
        .filter(|date| !is_null(date))
        .min()
        .cloned()
        .ok_or(MmcifError::MissingReleaseDate)?;

    let mut resolution = 0.0;
    for tag in RESOLUTION_TAGS {
        if let Some(raw) = block.first(tag) {
            match raw.parse::<f64>() {
                Ok(value) => {
                    resolution = value;
                    break;
                }
                Err(_) => debug!("Invalid resolution format for {}: '{}'", tag, raw),
            }
        }
    }

    let structure_method = block
        .values(EXPTL_METHOD_TAG)
        .unwrap_or_default()
        .iter()
        .map(|m| m.to_lowercase())
        .collect();

    Ok(StructureHeader {
        release_date,
        resolution,
        structure_method,
    })
}

fn protein_chains(block: &CifBlock) -> Result<Vec<ProteinChain<'_>>, MmcifError> {
    let chem_types: HashMap<&str, &str> = block
        .table(["_chem_comp.id", "_chem_comp.type"])?
        .unwrap_or_default()
        .into_iter()
        .map(|[id, kind]| (id, kind))
        .collect();

    let mut polymers: Vec<(&str, Vec<&str>)> = Vec::new();
    for [entity_id, mon_id] in block
        .table(["_entity_poly_seq.entity_id", "_entity_poly_seq.mon_id"])?
        .unwrap_or_default()
    {
        match polymers.iter_mut().find(|(id, _)| *id == entity_id) {
            Some((_, monomers)) => monomers.push(mon_id),
            None => polymers.push((entity_id, vec![mon_id])),
        }
    }

    let mut entity_chains: HashMap<&str, Vec<&str>> = HashMap::new();
    for [chain_id, entity_id] in block
        .table(["_struct_asym.id", "_struct_asym.entity_id"])?
        .unwrap_or_default()
    {
        entity_chains.entry(entity_id).or_default().push(chain_id);
    }

    let is_peptide = |mon_id: &&str| {
        chem_types
            .get(mon_id)
            .is_some_and(|kind| kind.to_ascii_lowercase().contains("peptide"))
    };

    let mut chains = Vec::new();
    for (entity_id, monomers) in polymers {
        if !monomers.iter().any(is_peptide) {
            continue;
        }
        for label_id in entity_chains.get(entity_id).into_iter().flatten() {
            chains.push(ProteinChain {
                label_id: *label_id,
                entity_id,
                monomers: monomers.clone(),
            });
        }
    }
    Ok(chains)
}

fn label_to_author_chain(block: &CifBlock) -> Result<HashMap<&str, &str>, MmcifError> {
    let mut mapping = HashMap::new();

    for [asym_id, strand_id] in block
        .table([
            "_pdbx_poly_seq_scheme.asym_id",
            "_pdbx_poly_seq_scheme.pdb_strand_id",
        ])?
        .unwrap_or_default()
    {
        if !is_null(strand_id) {
            mapping.entry(asym_id).or_insert(strand_id);
        }
    }

    let models = block.values("_atom_site.pdbx_PDB_model_num");
    for (row, [label_id, auth_id]) in block
        .table(["_atom_site.label_asym_id", "_atom_site.auth_asym_id"])?
        .unwrap_or_default()
        .into_iter()
        .enumerate()
    {
        let first_model = models
            .and_then(|m| m.get(row))
            .is_none_or(|model| model == "1");
        if first_model && !is_null(auth_id) {
            mapping.insert(label_id, auth_id);
        }
    }

    Ok(mapping)
}

/// Builds a [`StructureRecord`] from mmCIF text.
///
/// # Errors
///
/// Returns an [`MmcifError`] for malformed CIF syntax, a missing release date, a
/// file without protein chains, or a protein chain that has no author chain id.
pub fn parse_structure(file_id: &str, contents: &str) -> Result<StructureRecord, MmcifError> {
    let block = CifBlock::parse_with(contents, is_retained_tag)?;

    let header = parse_header(&block)?;
    let chains = protein_chains(&block)?;
    if chains.is_empty() {
        return Err(MmcifError::NoProteinChains);
    }
    let author_ids = label_to_author_chain(&block)?;

    let mut record = StructureRecord::new(file_id, header);
    for chain in chains {
        let author_id = author_ids
            .get(chain.label_id)
            .ok_or_else(|| MmcifError::MissingAuthorChain(chain.label_id.to_string()))?;
        record.insert_chain(
            *author_id,
            chain.entity_id,
            sequence_from_monomers(chain.monomers),
        );
    }
    Ok(record)
}

/// The built-in [`StructureParser`] for PDBx/mmCIF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MmcifParser;

impl MmcifParser {
    pub fn new() -> Self {
        Self
    }
}

impl StructureParser for MmcifParser {
    fn parse(&self, file_id: &str, contents: &str) -> ParsedRecord {
        match parse_structure(file_id, contents) {
            Ok(record) => ParsedRecord::Parsed(record),
            Err(e) => {
                debug!(file_id, error = %e, "mmCIF parser rejected input.");
                ParsedRecord::rejected(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CHAIN_CIF: &str = r#"data_1ABC
#
loop_
_pdbx_audit_revision_history.ordinal
_pdbx_audit_revision_history.revision_date
1 2003-05-20
2 2001-02-03
#
_refine.ls_d_res_high 1.80
_reflns.d_resolution_high 2.50
_exptl.method 'X-RAY DIFFRACTION'
#
loop_
_chem_comp.id
_chem_comp.type
ALA 'L-peptide linking'
GLY "PEPTIDE LINKING"
MSE 'L-peptide linking'
HOH non-polymer
#
loop_
_entity_poly_seq.entity_id
_entity_poly_seq.num
_entity_poly_seq.mon_id
1 1 ALA
1 2 GLY
1 3 MSE
2 1 GLY
2 2 GLY
#
loop_
_struct_asym.id
_struct_asym.entity_id
A 1
B 2
C 3
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_asym_id
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
ATOM 1 A H 1
ATOM 2 B L 1
ATOM 3 B Z 2
HETATM 4 C H 1
"#;

    #[test]
    fn parses_header_and_chains() {
        let record = parse_structure("1abc", TWO_CHAIN_CIF).unwrap();

        assert_eq!(record.file_id, "1abc");
        assert_eq!(record.header.release_date, "2001-02-03");
        assert_eq!(record.header.resolution, 1.8);
        assert_eq!(record.header.structure_method, vec!["x-ray diffraction"]);

        let chains: Vec<_> = record.chains().collect();
        assert_eq!(chains, vec![("H", "AGM"), ("L", "GG")]);
        assert_eq!(record.entity_id("H"), Some("1"));
        assert_eq!(record.entity_id("L"), Some("2"));
    }

    #[test]
    fn only_consulted_tags_are_retained() {
        let block = CifBlock::parse_with(TWO_CHAIN_CIF, is_retained_tag).unwrap();

        assert_eq!(
            block.values("_atom_site.auth_asym_id").map(<[String]>::len),
            Some(4)
        );
        assert!(block.values("_atom_site.id").is_none());
        assert!(block.values("_atom_site.group_PDB").is_none());
        assert!(block.values("_pdbx_audit_revision_history.ordinal").is_none());
        assert!(block.values("_entity_poly_seq.num").is_none());
    }

    #[test]
    fn resolution_falls_back_to_next_tag_when_unparseable() {
        let cif = TWO_CHAIN_CIF.replace("_refine.ls_d_res_high 1.80", "_refine.ls_d_res_high ?");
        let record = parse_structure("1abc", &cif).unwrap();
        assert_eq!(record.header.resolution, 2.5);
    }

    #[test]
    fn resolution_defaults_to_zero() {
        let cif = TWO_CHAIN_CIF
            .replace("_refine.ls_d_res_high 1.80\n", "")
            .replace("_reflns.d_resolution_high 2.50\n", "");
        let record = parse_structure("1abc", &cif).unwrap();
        assert_eq!(record.header.resolution, 0.0);
    }

    #[test]
    fn missing_release_date_is_rejected() {
        let cif = r#"data_X
_exptl.method 'X-RAY DIFFRACTION'
"#;
        assert_eq!(
            parse_structure("x", cif),
            Err(MmcifError::MissingReleaseDate)
        );
    }

    #[test]
    fn file_without_peptide_entities_is_rejected() {
        let cif = r#"data_1DNA
_pdbx_audit_revision_history.revision_date 1999-01-01
loop_
_chem_comp.id
_chem_comp.type
DA 'DNA linking'
DT 'DNA linking'
loop_
_entity_poly_seq.entity_id
_entity_poly_seq.num
_entity_poly_seq.mon_id
1 1 DA
1 2 DT
_struct_asym.id A
_struct_asym.entity_id 1
"#;
        assert_eq!(
            parse_structure("1dna", cif),
            Err(MmcifError::NoProteinChains)
        );
    }

    #[test]
    fn author_chain_falls_back_to_poly_seq_scheme() {
        let cif = r#"data_2XYZ
_pdbx_audit_revision_history.revision_date 2010-10-10
_chem_comp.id ALA
_chem_comp.type 'L-peptide linking'
_entity_poly_seq.entity_id 1
_entity_poly_seq.num 1
_entity_poly_seq.mon_id ALA
_struct_asym.id A
_struct_asym.entity_id 1
loop_
_pdbx_poly_seq_scheme.asym_id
_pdbx_poly_seq_scheme.entity_id
_pdbx_poly_seq_scheme.pdb_strand_id
A 1 Q
"#;
        let record = parse_structure("2xyz", cif).unwrap();
        assert_eq!(record.chains().collect::<Vec<_>>(), vec![("Q", "A")]);
    }

    #[test]
    fn chain_without_author_id_is_rejected() {
        let cif = r#"data_2XYZ
_pdbx_audit_revision_history.revision_date 2010-10-10
_chem_comp.id ALA
_chem_comp.type 'L-peptide linking'
_entity_poly_seq.entity_id 1
_entity_poly_seq.num 1
_entity_poly_seq.mon_id ALA
_struct_asym.id A
_struct_asym.entity_id 1
"#;
        assert_eq!(
            parse_structure("2xyz", cif),
            Err(MmcifError::MissingAuthorChain("A".into()))
        );
    }

    #[test]
    fn text_fields_and_quotes_are_tokenized() {
        let cif = "data_T\n_a.text\n;line one\nline two\n;\n_a.quoted 'it''s fine'\n_a.hash value#notcomment # comment\n";
        let block = CifBlock::parse(cif).unwrap();

        assert_eq!(block.name, "T");
        assert_eq!(block.first("_a.text"), Some("line one\nline two"));
        assert_eq!(block.first("_a.quoted"), Some("it''s fine"));
        assert_eq!(block.first("_a.hash"), Some("value#notcomment"));
    }

    #[test]
    fn only_first_data_block_is_read() {
        let block = CifBlock::parse("data_ONE\n_a.x 1\ndata_TWO\n_a.x 2\n").unwrap();
        assert_eq!(block.values("_a.x"), Some(&["1".to_string()][..]));
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert_eq!(
            CifBlock::parse("# only a comment\n"),
            Err(MmcifError::MissingDataBlock)
        );
        assert_eq!(
            CifBlock::parse("_a.x 1\n"),
            Err(MmcifError::UnexpectedValue {
                value: "1".into(),
                line: 1
            })
        );
        assert_eq!(
            CifBlock::parse("data_X\n_a.x\n_a.y 1\n"),
            Err(MmcifError::MissingValue {
                tag: "_a.x".into(),
                line: 2
            })
        );
        assert_eq!(
            CifBlock::parse("data_X\nloop_\n_a.x\n_a.y\n1 2 3\n"),
            Err(MmcifError::RaggedLoop {
                line: 2,
                columns: 2,
                values: 3
            })
        );
        assert_eq!(
            CifBlock::parse("data_X\n_a.x\n;never closed\n"),
            Err(MmcifError::UnterminatedTextField { line: 3 })
        );
        assert_eq!(
            CifBlock::parse("data_X\n_a.x 'open\n"),
            Err(MmcifError::UnterminatedQuote { line: 2 })
        );
    }

    #[test]
    fn table_reports_inconsistent_columns() {
        let block = CifBlock::parse("data_X\n_a.x 1\n_a.x 2\n_a.y 3\n").unwrap();
        assert_eq!(
            block.table(["_a.x", "_a.y"]),
            Err(MmcifError::InconsistentColumns {
                tag: "_a.y".into(),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(block.table(["_a.x", "_missing.z"]), Ok(None));
    }

    #[test]
    fn parser_turns_errors_into_rejections() {
        let parser = MmcifParser::new();
        match parser.parse("bad", "not a cif file") {
            ParsedRecord::Rejected { reason } => {
                assert_eq!(reason, "Unexpected value 'not' on line 1")
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert!(matches!(
            parser.parse("1abc", TWO_CHAIN_CIF),
            ParsedRecord::Parsed(_)
        ));
    }
}
