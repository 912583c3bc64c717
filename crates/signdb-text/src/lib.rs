//! signdb-text
//!
//! Tantivy-based lexical (BM25) index over description variants. See
//! `index` for the [`TextIndexer`](signdb_core::traits::TextIndexer) impl.

pub mod index;
pub mod tantivy_utils;

pub use index::TantivyIndexer;
