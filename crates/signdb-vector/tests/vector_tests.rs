use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use signdb_core::traits::{Embedder, VectorIndexer};
use signdb_core::types::{SourceKind, VariantEntry};
use signdb_embed::FakeEmbedder;
use signdb_vector::{CachedEmbedder, EmbeddingCache, LanceVectorIndex};

fn entries(texts: &[&str]) -> Vec<VariantEntry> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| VariantEntry {
            id: VariantEntry::variant_id(i as i64, 0),
            unit_id: i as i64,
            variant_index: 0,
            total_variants: 1,
            content: t.to_string(),
        })
        .collect()
}

#[test]
fn nearest_variant_ranks_first() {
    let embedder = FakeEmbedder::new(256).expect("fake");
    let docs = entries(&["wave hand side to side", "palm facing outward", "move fist in circle"]);
    let texts: Vec<String> = docs.iter().map(|e| e.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");

    let index = LanceVectorIndex::new_temp().expect("index");
    index.index(&docs, &embeddings).expect("index");
    assert_eq!(index.len(), 3);

    let q = embedder.embed_batch(&["wave hand".to_string()]).expect("q").remove(0);
    let hits = index.search_vec(&q, 2).expect("search");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "0:0");
    assert_eq!(hits[0].source, SourceKind::Vector);
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn ties_keep_insertion_order_and_dims_are_checked() {
    let docs = entries(&["a", "b", "c"]);
    let same = vec![vec![1.0, 0.0]; 3];
    let index = LanceVectorIndex::new_temp().expect("index");
    index.index(&docs, &same).expect("index");

    let hits = index.search_vec(&[2.0, 0.0], 3).expect("search");
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["0:0", "1:0", "2:0"]);

    assert_eq!(index.search_vec(&[2.0, 0.0], usize::MAX).expect("oversized k").len(), 3);
    assert!(index.search_vec(&[1.0, 0.0, 0.0], 1).is_err(), "dimension mismatch");
    assert!(index.index(&entries(&["d"]), &[vec![1.0]]).is_err(), "mixed dimensions");
    assert!(index.index(&entries(&["d"]), &[]).is_err(), "length mismatch");
    assert_eq!(index.len(), 3, "rejected batches leave the table untouched");
}

#[test]
fn empty_index_returns_nothing() {
    let index = LanceVectorIndex::new_temp().expect("index");
    assert!(index.is_empty());
    assert!(index.search_vec(&[1.0, 0.0], 5).expect("search").is_empty());
}

#[test]
fn later_batches_append_to_the_table() {
    let index = LanceVectorIndex::new_temp().expect("index");
    let docs = entries(&["a", "b"]);
    index.index(&docs[..1], &[vec![1.0, 0.0]]).expect("first batch");
    index.index(&docs[1..], &[vec![0.0, 1.0]]).expect("second batch");
    assert_eq!(index.len(), 2);

    let hits = index.search_vec(&[0.1, 0.9], 2).expect("search");
    assert_eq!(hits[0].id, "1:0");
    assert!((hits[0].score - 0.9 / (0.82f32).sqrt()).abs() < 1e-4, "score is cosine similarity");
}

struct CountingEmbedder {
    inner: FakeEmbedder,
    calls: AtomicUsize,
    texts: AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn embedder_id(&self) -> &str { self.inner.embedder_id() }
    fn dim(&self) -> usize { self.inner.dim() }
    fn max_len(&self) -> usize { self.inner.max_len() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

#[test]
fn cache_only_embeds_misses() {
    let counting = Arc::new(CountingEmbedder { inner: FakeEmbedder::new(64).expect("fake"), calls: AtomicUsize::new(0), texts: AtomicUsize::new(0) });
    let cache = Arc::new(EmbeddingCache::new());
    let embedder = CachedEmbedder::new(counting.clone(), cache.clone());

    let first = embedder.embed_batch(&["one".into(), "two".into(), "one".into()]).expect("first");
    assert_eq!(first.len(), 3);
    assert_eq!(first[0], first[2]);
    assert_eq!(counting.texts.load(Ordering::SeqCst), 2, "duplicate text embedded once");
    assert_eq!(cache.len(), 2);

    let second = embedder.embed_batch(&["two".into(), "three".into()]).expect("second");
    assert_eq!(second[0], first[1]);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    assert_eq!(counting.texts.load(Ordering::SeqCst), 3, "only 'three' was new");

    embedder.embed_batch(&["one".into()]).expect("all cached");
    assert_eq!(counting.calls.load(Ordering::SeqCst), 2, "no provider call when everything is cached");
}
