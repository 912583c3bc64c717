//! signdb-vector
//!
//! Semantic side of hybrid search: a LanceDB vector table over variant
//! embeddings and a content-hash keyed embedding cache.

pub mod cache;
pub mod lance;

pub use cache::{content_hash, CachedEmbedder, EmbeddingCache};
pub use lance::LanceVectorIndex;
