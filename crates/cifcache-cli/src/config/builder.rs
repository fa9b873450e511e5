use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use crate::cli::{BuildArgs, Cli, Commands};
use crate::error::Result;
use cifcache::engine::config::{BuildConfig, BuildConfigBuilder, CacheMode};
use cifcache::engine::error::CacheError;
use std::path::PathBuf;

/// Merges command-line arguments, the optional config file and built-in defaults
/// into a core [`BuildConfig`]. A value given on the command line always wins.
pub fn build_config(cli: &Cli) -> Result<BuildConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let file_marker = cli
        .file_marker
        .clone()
        .or(file_config.file_marker)
        .unwrap_or_else(|| defaults.file_marker.clone());

    let (mode, args, file_workers, file_chunksize, cluster_file, dump_console) = match &cli.command
    {
        Commands::Chains(chains) => {
            let file = file_config.chains.unwrap_or_default();
            (
                CacheMode::Chains,
                &chains.build,
                file.no_workers,
                file.chunksize,
                chains.cluster_file.clone().or(file.cluster_file),
                chains
                    .dump_console
                    .or(file.dump_console)
                    .unwrap_or(defaults.dump_console),
            )
        }
        Commands::Entries(entries) => {
            let file = file_config.entries.unwrap_or_default();
            (
                CacheMode::Entries,
                &entries.build,
                file.no_workers,
                file.chunksize,
                None::<PathBuf>,
                defaults.dump_console,
            )
        }
    };

    let config = builder_for(args, mode)
        .workers(
            args.no_workers
                .or(file_workers)
                .unwrap_or(defaults.workers(mode)),
        )
        .chunk_size(
            args.chunksize
                .or(file_chunksize)
                .unwrap_or(defaults.chunk_size),
        )
        .file_marker(file_marker)
        .cluster_file(cluster_file)
        .dump_console(dump_console)
        .build()
        .map_err(CacheError::from)?;
    Ok(config)
}

fn builder_for(args: &BuildArgs, mode: CacheMode) -> BuildConfigBuilder {
    BuildConfigBuilder::new()
        .input_dir(args.input_directory.clone())
        .output_path(args.output_path.clone())
        .mode(mode)
}
