//! # cifcache Core Library
//!
//! A parallel cache builder that condenses a directory of macromolecular structure
//! files (mmCIF, plain or gzip-compressed) into a single deterministic JSON cache of
//! per-chain or per-entry metadata.
//!
//! ## Architectural Philosophy
//!
//! The library is organized in three layers:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`StructureRecord`, cache
//!   entries), the built-in mmCIF reader, the cluster membership index and input
//!   file discovery.
//!
//! - **[`engine`]: The Logic Core.** Record projectors, the bounded parse worker pool,
//!   the single-owner aggregator, the atomic cache writer, configuration and progress
//!   reporting.
//!
//! - **[`workflows`]: The Public API.** Ties `core` and `engine` together into one
//!   end-to-end cache build that front ends (such as the `cifcache` CLI) invoke.

pub mod core;
pub mod engine;
pub mod workflows;

#[cfg(test)]
pub(crate) mod testing;
