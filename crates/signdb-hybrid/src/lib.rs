//! signdb-hybrid
//!
//! Hybrid retrieval over unit descriptions: a semantic (embedding) channel and
//! a lexical (BM25) channel, merged with reciprocal-rank fusion and collapsed
//! to one result per unit.

pub mod fusion;
pub mod index;
pub mod service;

pub use fusion::{fuse, reciprocal_rank, FusedUnit, RankedVariant};
pub use index::{HybridIndex, IndexStats};
pub use service::{SearchOptions, SearchService};
