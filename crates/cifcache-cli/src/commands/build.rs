use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use cifcache::core::io::mmcif::MmcifParser;
use cifcache::engine::aggregator::BuildSummary;
use cifcache::engine::config::BuildConfig;
use cifcache::engine::progress::ProgressReporter;
use cifcache::workflows;
use tracing::{info, warn};

/// Runs one cache build. Shared by the `chains` and `entries` subcommands, which
/// differ only in the [`BuildConfig`] they produce.
pub async fn run(config: BuildConfig, show_progress: bool) -> Result<BuildSummary> {
    let progress_handler = if show_progress {
        CliProgressHandler::new()
    } else {
        CliProgressHandler::hidden()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let parser = MmcifParser::new();

    info!(
        "Building {} cache from {:?} with {} worker(s), chunk size {}.",
        config.mode, config.input_dir, config.pool.workers, config.pool.chunk_size
    );

    let summary =
        tokio::task::block_in_place(|| workflows::build::run(&config, &parser, &reporter))?;

    if summary.failed > 0 {
        warn!(
            "{} file(s) could not be read and were skipped.",
            summary.failed
        );
    }
    if summary.overwritten > 0 {
        warn!(
            "{} cache key(s) were produced by more than one file.",
            summary.overwritten
        );
    }
    info!(
        "Wrote {} entries to {:?} ({} parsed, {} skipped).",
        summary.entries,
        config.output_path,
        summary.succeeded,
        summary.soft_failed + summary.failed
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cifcache::engine::config::{BuildConfigBuilder, CacheMode};
    use std::fs;
    use tempfile::tempdir;

    const STRUCTURE: &str = "data_1ABC
_pdbx_audit_revision_history.revision_date 2001-02-03
_refine.ls_d_res_high 2.10
loop_
_chem_comp.id
_chem_comp.type
MET 'L-peptide linking'
LYS 'L-peptide linking'
loop_
_entity_poly_seq.entity_id
_entity_poly_seq.num
_entity_poly_seq.mon_id
1 1 MET
1 2 LYS
loop_
_struct_asym.id
_struct_asym.entity_id
A 1
loop_
_atom_site.group_PDB
_atom_site.label_asym_id
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
ATOM A B 1
";

    #[tokio::test(flavor = "multi_thread")]
    async fn run_writes_cache_and_returns_summary() {
        let input = tempdir().unwrap();
        fs::write(input.path().join("1abc.cif"), STRUCTURE).unwrap();
        fs::write(input.path().join("2bad.cif"), "data_2BAD\n").unwrap();
        let out = input.path().join("chains.json");

        let config = BuildConfigBuilder::new()
            .input_dir(input.path().to_path_buf())
            .output_path(out.clone())
            .mode(CacheMode::Chains)
            .build()
            .unwrap();

        let summary = run(config, false).await.unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.soft_failed, 1);
        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("\"1abc_B\""));
        assert!(written.contains("\"seq\": \"MK\""));
        assert!(written.contains("\"resolution\": 2.1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_fails_for_missing_input_directory() {
        let dir = tempdir().unwrap();
        let config = BuildConfigBuilder::new()
            .input_dir(dir.path().join("missing"))
            .output_path(dir.path().join("entries.json"))
            .mode(CacheMode::Entries)
            .build()
            .unwrap();

        assert!(run(config, false).await.is_err());
        assert!(!dir.path().join("entries.json").exists());
    }
}
