use super::config::PoolOptions;
use super::error::CacheError;
use super::projector::RecordProjector;
use crate::core::discovery::CandidateFile;
use crate::core::io::source::read_structure;
use crate::core::io::traits::{ParsedRecord, StructureParser};
use crate::core::models::cache::CacheEntry;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::mpsc;
#[cfg(feature = "parallel")]
use std::thread;

/// What happened to a single candidate file. Every dispatched file yields exactly
/// one outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Parsed and projected; `entries` may be empty for a structure without chains.
    Success {
        file_name: String,
        entries: Vec<(String, CacheEntry)>,
    },
    /// The parser rejected the file's contents.
    SoftFailure { file_name: String, reason: String },
    /// The file could not be read or decompressed, or the parser panicked.
    Failed { file_name: String, error: String },
}

impl ParseOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            ParseOutcome::Success { file_name, .. }
            | ParseOutcome::SoftFailure { file_name, .. }
            | ParseOutcome::Failed { file_name, .. } => file_name,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Reads, parses and projects one file. Never panics; a panic inside the parser
/// or projector is converted into [`ParseOutcome::Failed`].
pub fn process_file(
    candidate: &CandidateFile,
    parser: &dyn StructureParser,
    projector: &dyn RecordProjector,
) -> ParseOutcome {
    let file_name = candidate.file_name.clone();

    let contents = match read_structure(candidate) {
        Ok(contents) => contents,
        Err(e) => {
            return ParseOutcome::Failed {
                file_name,
                error: format!("failed to read file: {}", e),
            };
        }
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        match parser.parse(&candidate.entry_id, &contents) {
            ParsedRecord::Parsed(record) => Ok(projector.project(&record)),
            ParsedRecord::Rejected { reason } => Err(reason),
        }
    }));

    match result {
        Ok(Ok(entries)) => ParseOutcome::Success { file_name, entries },
        Ok(Err(reason)) => ParseOutcome::SoftFailure { file_name, reason },
        Err(payload) => ParseOutcome::Failed {
            file_name,
            error: format!("parser panicked: {}", panic_message(payload.as_ref())),
        },
    }
}

/// Parses every candidate and hands each outcome to `on_outcome` as it completes.
///
/// With `workers == 0` files are processed in order on the calling thread.
/// Otherwise a dedicated pool of `workers` threads processes batches of
/// `chunk_size` files and sends outcomes over a channel; `on_outcome` always runs
/// on the calling thread, so it is the single writer of whatever it accumulates.
#[instrument(skip_all, name = "parse_pool", fields(files = files.len(), workers = options.workers))]
pub fn run_pool<F>(
    files: &[CandidateFile],
    parser: &dyn StructureParser,
    projector: &dyn RecordProjector,
    options: PoolOptions,
    mut on_outcome: F,
) -> Result<(), CacheError>
where
    F: FnMut(ParseOutcome),
{
    if options.workers == 0 {
        debug!("Parsing {} file(s) sequentially.", files.len());
        for file in files {
            on_outcome(process_file(file, parser, projector));
        }
        return Ok(());
    }

    run_parallel(files, parser, projector, options, on_outcome)
}

#[cfg(feature = "parallel")]
fn run_parallel<F>(
    files: &[CandidateFile],
    parser: &dyn StructureParser,
    projector: &dyn RecordProjector,
    options: PoolOptions,
    mut on_outcome: F,
) -> Result<(), CacheError>
where
    F: FnMut(ParseOutcome),
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|i| format!("cifcache-parse-{}", i))
        .build()
        .map_err(|e| CacheError::WorkerPool {
            workers: options.workers,
            reason: e.to_string(),
        })?;
    let chunk_size = options.chunk_size.max(1);

    debug!(
        "Parsing {} file(s) on {} worker(s) in batches of {}.",
        files.len(),
        options.workers,
        chunk_size
    );

    let (sender, receiver) = mpsc::channel::<ParseOutcome>();
    thread::scope(|scope| {
        scope.spawn(move || {
            pool.install(|| {
                files
                    .par_chunks(chunk_size)
                    .for_each_with(sender, |sender, batch| {
                        for file in batch {
                            // The receiver lives until every sender is gone.
                            if sender.send(process_file(file, parser, projector)).is_err() {
                                return;
                            }
                        }
                    });
            });
        });

        for outcome in receiver {
            on_outcome(outcome);
        }
    });

    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn run_parallel<F>(
    files: &[CandidateFile],
    parser: &dyn StructureParser,
    projector: &dyn RecordProjector,
    options: PoolOptions,
    mut on_outcome: F,
) -> Result<(), CacheError>
where
    F: FnMut(ParseOutcome),
{
    tracing::warn!(
        "Built without the 'parallel' feature; ignoring {} worker(s) and parsing sequentially.",
        options.workers
    );
    for file in files {
        on_outcome(process_file(file, parser, projector));
    }
    Ok(())
}
