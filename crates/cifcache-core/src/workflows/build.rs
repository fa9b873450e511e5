use crate::core::clusters::ClusterIndex;
use crate::core::discovery::discover;
use crate::core::io::traits::StructureParser;
use crate::core::models::cache::FinalCache;
use crate::engine::aggregator::{Aggregator, BuildSummary};
use crate::engine::config::{BuildConfig, CacheMode};
use crate::engine::error::CacheError;
use crate::engine::pool::run_pool;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::projector::{ChainProjector, EntryProjector, RecordProjector};
use crate::engine::writer::CacheWriter;
use tracing::{info, instrument};

/// Builds the cache described by `config` and writes it to `config.output_path`.
///
/// Fatal errors (unreadable input directory, unreadable cluster file, unwritable
/// output) abort the run without touching the output path. Files that fail to
/// parse are skipped and counted in the returned summary.
#[instrument(skip_all, name = "cache_build_workflow", fields(mode = %config.mode))]
pub fn run(
    config: &BuildConfig,
    parser: &dyn StructureParser,
    reporter: &ProgressReporter,
) -> Result<BuildSummary, CacheError> {
    let (cache, summary) = build_cache(config, parser, reporter)?;

    reporter.report(Progress::PhaseStart {
        name: "Writing cache",
    });
    CacheWriter::new(&config.output_path)
        .with_console_echo(config.dump_console)
        .write(&cache)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        entries = summary.entries,
        succeeded = summary.succeeded,
        soft_failed = summary.soft_failed,
        failed = summary.failed,
        "Build complete."
    );
    Ok(summary)
}

/// Runs discovery, parsing and aggregation without writing anything.
pub fn build_cache(
    config: &BuildConfig,
    parser: &dyn StructureParser,
    reporter: &ProgressReporter,
) -> Result<(FinalCache, BuildSummary), CacheError> {
    // === Phase 1: Discovery ===
    reporter.report(Progress::PhaseStart {
        name: "Discovering structure files",
    });
    let files = discover(&config.input_dir, &config.file_marker)?;
    let projector = make_projector(config)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        "Building {} cache from {} file(s) in {:?}.",
        config.mode,
        files.len(),
        config.input_dir
    );

    // === Phase 2: Parsing and aggregation ===
    reporter.report(Progress::PhaseStart {
        name: "Parsing structures",
    });
    reporter.report(Progress::TaskStart {
        total_steps: files.len() as u64,
    });

    let mut aggregator = Aggregator::new();
    run_pool(
        &files,
        parser,
        projector.as_ref(),
        config.pool,
        |outcome| {
            let completed = aggregator.merge(outcome);
            reporter.report(Progress::TaskIncrement { completed });
        },
    )?;

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    Ok(aggregator.finish())
}

fn make_projector(config: &BuildConfig) -> Result<Box<dyn RecordProjector>, CacheError> {
    Ok(match config.mode {
        CacheMode::Chains => {
            let clusters = config
                .cluster_file
                .as_deref()
                .map(ClusterIndex::load)
                .transpose()?;
            Box::new(ChainProjector::new(clusters))
        }
        CacheMode::Entries => Box::new(EntryProjector),
    })
}
