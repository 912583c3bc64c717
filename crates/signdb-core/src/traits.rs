use crate::types::{SearchHit, VariantEntry};

/// Text-to-vector provider. Implementations return one vector per input text,
/// all of length `dim()`.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `gemini:text-embedding-004`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

pub trait TextIndexer: Send + Sync {
    fn index(&self, entries: &[VariantEntry]) -> anyhow::Result<()>;
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

pub trait VectorIndexer: Send + Sync {
    fn index(&self, entries: &[VariantEntry], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
}
