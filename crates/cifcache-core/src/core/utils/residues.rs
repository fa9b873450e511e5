use phf::{Map, phf_map};

/// One-letter code used for any monomer without a known parent amino acid.
pub const UNKNOWN_RESIDUE: char = 'X';

static RESTYPE_3TO1: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',

    // Modified residues collapse to their parent amino acid.
    "MSE" => 'M', "FME" => 'M', "MHO" => 'M', "CXM" => 'M', "OMT" => 'M',
    "SEP" => 'S', "DSN" => 'S',
    "TPO" => 'T', "DTH" => 'T',
    "PTR" => 'Y', "TYS" => 'Y', "TYI" => 'Y', "DTY" => 'Y',
    "HYP" => 'P', "DPR" => 'P',
    "MLY" => 'K', "M3L" => 'K', "ALY" => 'K', "KCX" => 'K', "LLP" => 'K', "DLY" => 'K',
    "CSO" => 'C', "CSD" => 'C', "CME" => 'C', "CAS" => 'C', "CSS" => 'C', "OCS" => 'C',
    "CSX" => 'C', "SMC" => 'C', "SCH" => 'C', "SCY" => 'C', "DCY" => 'C',
    "MLE" => 'L', "NLE" => 'L', "DLE" => 'L',
    "MVA" => 'V', "DVA" => 'V',
    "AIB" => 'A', "ABA" => 'A', "DAL" => 'A',
    "SAR" => 'G',
    "CGU" => 'E', "PCA" => 'E', "DGL" => 'E',
    "NEP" => 'H', "HIC" => 'H', "DHI" => 'H',
    "DAR" => 'R', "DAS" => 'D', "DGN" => 'Q', "DSG" => 'N', "DIL" => 'I',
    "DPN" => 'F', "DTR" => 'W',
};

pub fn three_to_one(residue_name: &str) -> char {
    RESTYPE_3TO1
        .get(residue_name)
        .copied()
        .unwrap_or(UNKNOWN_RESIDUE)
}

pub fn sequence_from_monomers<'a>(monomers: impl IntoIterator<Item = &'a str>) -> String {
    monomers.into_iter().map(three_to_one).collect()
}
