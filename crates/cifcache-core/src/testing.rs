//! Fixture builders shared by the unit tests of the engine and workflows.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub(crate) struct ChainSpec<'a> {
    pub author_id: &'a str,
    pub entity_id: &'a str,
    pub monomers: &'a [&'a str],
}

pub(crate) fn chain<'a>(
    author_id: &'a str,
    entity_id: &'a str,
    monomers: &'a [&'a str],
) -> ChainSpec<'a> {
    ChainSpec {
        author_id,
        entity_id,
        monomers,
    }
}

/// Renders a small but well-formed mmCIF document with one label chain per spec.
pub(crate) fn mmcif_text(
    entry_id: &str,
    release_date: &str,
    resolution: f64,
    chains: &[ChainSpec],
) -> String {
    let mut text = format!("data_{}\n#\n", entry_id.to_uppercase());
    text.push_str("loop_\n_pdbx_audit_revision_history.ordinal\n_pdbx_audit_revision_history.revision_date\n");
    text.push_str(&format!("1 {}\n2 2099-12-31\n#\n", release_date));
    text.push_str(&format!("_refine.ls_d_res_high {:.2}\n#\n", resolution));

    text.push_str("loop_\n_chem_comp.id\n_chem_comp.type\n");
    let mut seen_monomers: Vec<&str> = Vec::new();
    for spec in chains {
        for mon in spec.monomers {
            if !seen_monomers.contains(mon) {
                seen_monomers.push(mon);
                text.push_str(&format!("{} 'L-peptide linking'\n", mon));
            }
        }
    }

    text.push_str("#\nloop_\n_entity_poly_seq.entity_id\n_entity_poly_seq.num\n_entity_poly_seq.mon_id\n");
    let mut seen_entities: Vec<&str> = Vec::new();
    for spec in chains {
        if seen_entities.contains(&spec.entity_id) {
            continue;
        }
        seen_entities.push(spec.entity_id);
        for (num, mon) in spec.monomers.iter().enumerate() {
            text.push_str(&format!("{} {} {}\n", spec.entity_id, num + 1, mon));
        }
    }

    text.push_str("#\nloop_\n_struct_asym.id\n_struct_asym.entity_id\n");
    for (i, spec) in chains.iter().enumerate() {
        text.push_str(&format!("L{} {}\n", i, spec.entity_id));
    }

    text.push_str("#\nloop_\n_atom_site.group_PDB\n_atom_site.id\n_atom_site.label_asym_id\n_atom_site.auth_asym_id\n_atom_site.pdbx_PDB_model_num\n");
    for (i, spec) in chains.iter().enumerate() {
        text.push_str(&format!("ATOM {} L{} {} 1\n", i + 1, i, spec.author_id));
    }
    text.push_str("#\n");
    text
}

pub(crate) fn write_plain(dir: &Path, file_name: &str, contents: &str) {
    fs::write(dir.join(file_name), contents).expect("Failed to write fixture file");
}

pub(crate) fn write_gzip(dir: &Path, file_name: &str, contents: &str) {
    let file = File::create(dir.join(file_name)).expect("Failed to create fixture file");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(contents.as_bytes())
        .expect("Failed to compress fixture");
    encoder.finish().expect("Failed to finish gzip stream");
}

/// Populates `dir` with two parseable structures, one gzip-compressed, plus a
/// file the parser rejects and an unrelated text file.
pub(crate) fn populate_mixed_directory(dir: &Path) {
    write_plain(
        dir,
        "1abc.cif",
        &mmcif_text(
            "1abc",
            "2001-02-03",
            1.8,
            &[
                chain("A", "1", &["MET", "LYS", "VAL"]),
                chain("B", "2", &["GLY", "GLY"]),
            ],
        ),
    );
    write_gzip(
        dir,
        "2xyz.cif.gz",
        &mmcif_text("2xyz", "2015-06-07", 3.1, &[chain("C", "1", &["TRP", "ALA"])]),
    );
    write_plain(dir, "9bad.cif", "data_9BAD\n_exptl.method 'X-RAY DIFFRACTION'\n");
    write_plain(dir, "notes.txt", "not a structure");
}
