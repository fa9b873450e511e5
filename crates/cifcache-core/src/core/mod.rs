//! # Core Module
//!
//! Fundamental building blocks for cache generation: everything here is either a
//! plain data model or a pure function of its inputs.
//!
//! - **Input Discovery** ([`discovery`]) - Enumerates candidate structure files in a directory
//! - **Cluster Membership** ([`clusters`]) - Read-only lookup of cluster sizes per entity
//! - **File I/O** ([`io`]) - Reading (optionally compressed) mmCIF files and parsing them
//! - **Data Models** ([`models`]) - Parsed structure records and cache entry schemas
//! - **Utilities** ([`utils`]) - Residue code tables

pub mod clusters;
pub mod discovery;
pub mod io;
pub mod models;
pub mod utils;
