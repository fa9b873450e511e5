//! # Workflows Module
//!
//! High-level entry points that run a complete cache build: discovery, parsing on
//! the worker pool, aggregation and output.
//!
//! ## Architecture
//!
//! - **Build Workflow** ([`build`]) - Produces a chain-level or entry-level cache
//!   from a directory of mmCIF files, reporting progress per phase and per file.
//!
//! Parsing is pluggable through [`crate::core::io::traits::StructureParser`]; the
//! command-line front end passes [`crate::core::io::mmcif::MmcifParser`].

pub mod build;
