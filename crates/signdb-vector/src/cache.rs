//! In-memory embedding cache keyed by `(content_hash, embedder_id)`.
//!
//! The cache is consulted prior to calling a provider and written through on
//! cache misses, so rebuilding the index from an unchanged unit snapshot does
//! not pay for the same embeddings twice.

use anyhow::{ensure, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use signdb_core::traits::Embedder;

pub fn content_hash(s: &str) -> String { blake3::hash(s.as_bytes()).to_hex().to_string() }

#[derive(Default)]
pub struct EmbeddingCache {
    entries: Mutex<HashMap<(String, String), Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self { Self::default() }

    pub fn get_many(&self, embedder_id: &str, hashes: &[String]) -> HashMap<String, Vec<f32>> {
        let Ok(entries) = self.entries.lock() else { return HashMap::new() };
        hashes
            .iter()
            .filter_map(|h| entries.get(&(h.clone(), embedder_id.to_string())).map(|v| (h.clone(), v.clone())))
            .collect()
    }

    pub fn put_many(&self, embedder_id: &str, items: impl IntoIterator<Item = (String, Vec<f32>)>) {
        if let Ok(mut entries) = self.entries.lock() {
            for (hash, vector) in items {
                entries.insert((hash, embedder_id.to_string()), vector);
            }
        }
    }

    pub fn len(&self) -> usize { self.entries.lock().map(|e| e.len()).unwrap_or(0) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Wraps a provider with an [`EmbeddingCache`]. Only cache misses reach the
/// inner provider, in one batch.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Arc<EmbeddingCache>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, cache: Arc<EmbeddingCache>) -> Self { Self { inner, cache } }

    pub fn cache(&self) -> &EmbeddingCache { &self.cache }
}

impl Embedder for CachedEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn dim(&self) -> usize { self.inner.dim() }
    fn max_len(&self) -> usize { self.inner.max_len() }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embedder_id = self.inner.embedder_id();
        let hashes: Vec<String> = texts.iter().map(|t| content_hash(t)).collect();
        let mut found = self.cache.get_many(embedder_id, &hashes);

        let mut miss_texts = Vec::new();
        let mut miss_hashes = Vec::new();
        for (text, hash) in texts.iter().zip(&hashes) {
            if !found.contains_key(hash) && !miss_hashes.contains(hash) {
                miss_texts.push(text.clone());
                miss_hashes.push(hash.clone());
            }
        }
        if !miss_texts.is_empty() {
            let fresh = self.inner.embed_batch(&miss_texts)?;
            ensure!(fresh.len() == miss_texts.len(), "provider returned {} vectors for {} texts", fresh.len(), miss_texts.len());
            tracing::debug!(hits = texts.len() - miss_texts.len(), misses = miss_texts.len(), "embedding cache");
            let pairs: Vec<(String, Vec<f32>)> = miss_hashes.into_iter().zip(fresh).collect();
            found.extend(pairs.iter().cloned());
            self.cache.put_many(embedder_id, pairs);
        }
        hashes
            .iter()
            .map(|h| found.get(h).cloned().ok_or_else(|| anyhow::anyhow!("missing embedding for content {h}")))
            .collect()
    }
}
