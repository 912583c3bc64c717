use anyhow::{anyhow, ensure, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use signdb_core::traits::{Embedder, TextIndexer, VectorIndexer};
use signdb_core::types::{RankedUnit, SearchHit, SearchWeights, Unit, UnitId, VariantEntry};
use signdb_core::variants::VariantSplitter;
use signdb_text::TantivyIndexer;
use signdb_vector::LanceVectorIndex;

use crate::fusion::{fuse, RankedVariant};

/// Counts reported by a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub units: usize,
    pub indexed_units: usize,
    pub variants: usize,
}

/// An immutable pair of semantic and lexical indices over one unit snapshot.
pub struct HybridIndex<TI = TantivyIndexer, VI = LanceVectorIndex> where TI: TextIndexer, VI: VectorIndexer {
    text: TI,
    vector: VI,
    embedder: Arc<dyn Embedder>,
    entries: Vec<VariantEntry>,
    by_variant: HashMap<String, usize>,
    units: HashMap<UnitId, Unit>,
    stats: IndexStats,
}

impl HybridIndex {
    /// Split, embed and index `units`. Returns `None` when no unit carries a
    /// usable description.
    pub fn build(units: &[Unit], splitter: &VariantSplitter, embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Option<Self>> {
        Self::build_with(units, splitter, embedder, batch_size, TantivyIndexer::new_in_ram()?, LanceVectorIndex::new_temp()?)
    }
}

impl<TI, VI> HybridIndex<TI, VI> where TI: TextIndexer, VI: VectorIndexer {
    pub fn build_with(units: &[Unit], splitter: &VariantSplitter, embedder: Arc<dyn Embedder>, batch_size: usize, text: TI, vector: VI) -> Result<Option<Self>> {
        let entries = splitter.entries_from_units(units);
        if entries.is_empty() {
            tracing::warn!(units = units.len(), "no valid descriptions found in units");
            return Ok(None);
        }
        tracing::info!(variants = entries.len(), units = units.len(), "indexing description variants");

        // 1) embed in batches
        let embeddings = embed_with_progress(embedder.as_ref(), &entries, batch_size.max(1))?;
        // 2) vector index
        vector.index(&entries, &embeddings)?;
        // 3) text index
        text.index(&entries)?;

        let by_variant = entries.iter().enumerate().map(|(i, e)| (e.id.clone(), i)).collect();
        let indexed_ids: HashSet<UnitId> = entries.iter().map(|e| e.unit_id).collect();
        let indexed: HashMap<UnitId, Unit> = units
            .iter()
            .filter(|u| indexed_ids.contains(&u.id))
            .map(|u| (u.id, u.clone()))
            .collect();
        let stats = IndexStats { units: units.len(), indexed_units: indexed.len(), variants: entries.len() };
        tracing::info!(?stats, "hybrid index ready");
        Ok(Some(Self { text, vector, embedder, entries, by_variant, units: indexed, stats }))
    }

    pub fn stats(&self) -> IndexStats { self.stats }

    /// Rank units for `query`, pulling `pool` candidates from each channel.
    ///
    /// The pool never exceeds the number of indexed variants.
    pub fn query(&self, query: &str, top_k: usize, pool: usize, weights: SearchWeights) -> Result<Vec<RankedUnit>> {
        if top_k == 0 { return Ok(Vec::new()); }
        let pool = pool.max(top_k).min(self.entries.len());
        let q_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedding provider returned no vector for the query"))?;
        let dense_hits = self.vector.search_vec(&q_vec, pool)?;
        let text_hits = self.text.search(query, pool)?;
        tracing::debug!(query, pool, dense = dense_hits.len(), text = text_hits.len(), "candidate pools");

        let semantic = self.resolve(&dense_hits)?;
        let lexical = self.resolve(&text_hits)?;
        let mut fused = fuse(&semantic, &lexical, weights);
        fused.truncate(top_k);

        fused
            .into_iter()
            .map(|f| -> Result<RankedUnit> {
                let unit = self.units.get(&f.unit_id).ok_or_else(|| anyhow!("unit {} missing from snapshot", f.unit_id))?;
                let matched = &self.entries[self.variant_index(&f.representative)?];
                Ok(RankedUnit {
                    unit_id: f.unit_id,
                    text: unit.text.clone(),
                    description: unit.description.clone().unwrap_or_default(),
                    video_url: unit.video_url.clone(),
                    image_url: unit.image_url.clone(),
                    transcription: unit.transcription.clone(),
                    relevance_score: f.score,
                    matched_description: matched.content.clone(),
                })
            })
            .collect()
    }

    fn resolve<'a>(&'a self, hits: &[SearchHit]) -> Result<Vec<RankedVariant<'a>>> {
        hits.iter()
            .map(|h| -> Result<RankedVariant<'a>> {
                let entry = &self.entries[self.variant_index(&h.id)?];
                Ok(RankedVariant { unit_id: entry.unit_id, variant_id: entry.id.as_str() })
            })
            .collect()
    }

    fn variant_index(&self, id: &str) -> Result<usize> {
        self.by_variant.get(id).copied().ok_or_else(|| anyhow!("unknown variant id '{id}'"))
    }
}

fn embed_with_progress(embedder: &dyn Embedder, entries: &[VariantEntry], batch_size: usize) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} variants ({percent}%) {msg}")?.progress_chars("#>-"));
    let mut embeddings = Vec::with_capacity(entries.len());
    for batch in entries.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|e| e.content.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        ensure!(vectors.len() == texts.len(), "provider returned {} vectors for {} texts", vectors.len(), texts.len());
        for v in &vectors { ensure!(v.len() == embedder.dim(), "embedding has {} dims, provider reports {}", v.len(), embedder.dim()); }
        embeddings.extend(vectors);
        pb.inc(batch.len() as u64);
    }
    pb.finish_with_message("embedded");
    Ok(embeddings)
}
