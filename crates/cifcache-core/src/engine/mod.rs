//! # Engine Module
//!
//! The stateful side of cache generation: everything that runs between "here is a
//! list of files" and "the cache is on disk".
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Build parameters, cache modes and pool sizing
//! - **Projection** ([`projector`]) - Strategies turning a parsed structure into cache entries
//! - **Parsing** ([`pool`]) - Bounded worker pool with per-file failure isolation
//! - **Aggregation** ([`aggregator`]) - Single-owner merge of outcomes into the final cache
//! - **Output** ([`writer`]) - Deterministic JSON serialization and atomic file writes
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Fatal build errors
//!
//! Per-file problems never surface as errors: they are recorded as
//! [`pool::ParseOutcome`] values, logged by the aggregator and counted in the
//! [`aggregator::BuildSummary`].

pub mod aggregator;
pub mod config;
pub mod error;
pub mod pool;
pub mod progress;
pub mod projector;
pub mod writer;
