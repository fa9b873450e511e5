//! Data models shared between the parser, the projectors and the cache writer.

pub mod cache;
pub mod record;
