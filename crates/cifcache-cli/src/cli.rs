use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan",
    version,
    about = "cifcache - Builds JSON metadata caches (release date, resolution, sequences, cluster sizes) from a directory of mmCIF files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Optional TOML file providing defaults for the build options.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Substring a file name must contain to be treated as a structure file (default: '.cif').
    #[arg(long, global = true, value_name = "STR")]
    pub file_marker: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a chain-level cache with one entry per protein chain.
    Chains(ChainsArgs),
    /// Build an entry-level cache with one entry per structure file.
    Entries(EntriesArgs),
}

/// Arguments shared by both cache modes.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Directory containing mmCIF files (optionally gzip-compressed).
    #[arg(required = true, value_name = "INPUT_DIRECTORY")]
    pub input_directory: PathBuf,

    /// Path of the JSON cache to write.
    #[arg(required = true, value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,

    /// Number of parse workers; 0 parses sequentially.
    #[arg(long = "no_workers", value_name = "NUM")]
    pub no_workers: Option<usize>,

    /// Number of files handed to a worker at a time.
    #[arg(long = "chunksize", value_name = "NUM")]
    pub chunksize: Option<usize>,
}

/// Arguments for the `chains` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ChainsArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Cluster file with one whitespace-separated cluster of `{ENTRY}_{ENTITY}` members per line.
    #[arg(long = "cluster_file", value_name = "PATH")]
    pub cluster_file: Option<PathBuf>,

    /// Also print the finished cache to stdout. `--dump_console=false` overrides the config file.
    #[arg(
        long = "dump_console",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub dump_console: Option<bool>,
}

/// Arguments for the `entries` subcommand.
#[derive(Args, Debug, Clone)]
pub struct EntriesArgs {
    #[command(flatten)]
    pub build: BuildArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_accepts_underscore_flags() {
        let cli = Cli::parse_from([
            "cifcache",
            "chains",
            "mmcif/",
            "chains.json",
            "--cluster_file",
            "clusters.txt",
            "--no_workers",
            "8",
            "--chunksize",
            "25",
            "--dump_console",
        ]);

        let Commands::Chains(args) = cli.command else {
            panic!("Expected 'chains' subcommand");
        };
        assert_eq!(args.build.input_directory, PathBuf::from("mmcif/"));
        assert_eq!(args.build.output_path, PathBuf::from("chains.json"));
        assert_eq!(args.cluster_file, Some(PathBuf::from("clusters.txt")));
        assert_eq!(args.build.no_workers, Some(8));
        assert_eq!(args.build.chunksize, Some(25));
        assert_eq!(args.dump_console, Some(true));
    }

    #[test]
    fn dump_console_accepts_an_explicit_value() {
        let cli = Cli::parse_from(["cifcache", "chains", "in", "out.json", "--dump_console=false"]);
        let Commands::Chains(args) = cli.command else {
            panic!("Expected 'chains' subcommand");
        };
        assert_eq!(args.dump_console, Some(false));

        let cli = Cli::parse_from(["cifcache", "chains", "in", "out.json"]);
        let Commands::Chains(args) = cli.command else {
            panic!("Expected 'chains' subcommand");
        };
        assert_eq!(args.dump_console, None);
    }

    #[test]
    fn entries_leaves_unset_options_empty() {
        let cli = Cli::parse_from(["cifcache", "-vv", "entries", "in", "out.json"]);

        assert_eq!(cli.verbose, 2);
        let Commands::Entries(args) = cli.command else {
            panic!("Expected 'entries' subcommand");
        };
        assert_eq!(args.build.no_workers, None);
        assert_eq!(args.build.chunksize, None);
    }

    #[test]
    fn global_options_may_follow_the_subcommand() {
        let cli = Cli::parse_from([
            "cifcache",
            "entries",
            "in",
            "out.json",
            "--file-marker",
            ".mmcif",
            "-c",
            "cifcache.toml",
        ]);
        assert_eq!(cli.file_marker.as_deref(), Some(".mmcif"));
        assert_eq!(cli.config, Some(PathBuf::from("cifcache.toml")));
    }

    #[test]
    fn entries_rejects_cluster_file() {
        let result = Cli::try_parse_from([
            "cifcache",
            "entries",
            "in",
            "out.json",
            "--cluster_file",
            "clusters.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn output_path_is_required() {
        assert!(Cli::try_parse_from(["cifcache", "chains", "in"]).is_err());
    }
}
