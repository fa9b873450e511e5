//! Provides input functionality for macromolecular structure files.
//!
//! Reading is split into two steps: [`source`] turns a candidate file into text
//! (transparently decompressing gzip archives), and a [`traits::StructureParser`]
//! turns that text into a [`crate::core::models::record::StructureRecord`]. The
//! built-in parser for the mmCIF format lives in [`mmcif`].

pub mod mmcif;
pub mod source;
pub mod traits;
