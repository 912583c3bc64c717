use std::sync::{Arc, Mutex, PoisonError, RwLock};

use signdb_core::config::Settings;
use signdb_core::traits::Embedder;
use signdb_core::types::{RankedUnit, SearchWeights, Unit};
use signdb_core::variants::VariantSplitter;
use signdb_core::{Error, Result};
use signdb_embed::embedder_from_settings;
use signdb_vector::{CachedEmbedder, EmbeddingCache};

use crate::index::{HybridIndex, IndexStats};

/// Minimum candidate pool multiplier; one unit may occupy several slots.
pub const MIN_OVERSAMPLE: usize = 3;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub weights: SearchWeights,
    pub oversample: usize,
    pub batch_size: usize,
    pub splitter: VariantSplitter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { weights: SearchWeights::default(), oversample: MIN_OVERSAMPLE, batch_size: 64, splitter: VariantSplitter::default() }
    }
}

impl SearchOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            weights: settings.search.weights(),
            oversample: settings.search.oversample.max(MIN_OVERSAMPLE),
            batch_size: settings.embedding.batch_size.max(1),
            splitter: settings.search.splitter()?,
        })
    }
}

/// Caller-owned hybrid search handle.
///
/// The index is built off-lock and swapped in whole, so searches running
/// during a rebuild see either the old index or the new one. Builds are
/// serialized with each other.
pub struct SearchService {
    embedder: Arc<dyn Embedder>,
    options: SearchOptions,
    index: RwLock<Option<Arc<HybridIndex>>>,
    build_lock: Mutex<()>,
}

impl SearchService {
    /// Wraps `embedder` with a fresh embedding cache.
    pub fn new(embedder: Arc<dyn Embedder>, options: SearchOptions) -> Self {
        let cached: Arc<dyn Embedder> = Arc::new(CachedEmbedder::new(embedder, Arc::new(EmbeddingCache::new())));
        Self { embedder: cached, options, index: RwLock::new(None), build_lock: Mutex::new(()) }
    }

    /// Build the configured embedding provider; missing credentials fail here.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let options = SearchOptions::from_settings(settings)?;
        let embedder = embedder_from_settings(&settings.embedding).map_err(|e| match e.downcast::<Error>() {
            Ok(err) => err,
            Err(other) => Error::InvalidConfig(format!("{other:#}")),
        })?;
        Ok(Self::new(Arc::from(embedder), options))
    }

    pub fn options(&self) -> &SearchOptions { &self.options }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    pub fn stats(&self) -> Option<IndexStats> {
        self.current().map(|index| index.stats())
    }

    /// Rebuild the index from a full unit snapshot, replacing any previous one.
    ///
    /// A snapshot without a single usable description leaves the service not
    /// ready; that is reported through the returned stats, not as an error.
    pub fn initialize(&self, units: &[Unit]) -> Result<IndexStats> {
        let _build = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.rebuild(units)
    }

    /// Build from `loader` unless an index is already in place.
    pub fn ensure_initialized<F>(&self, loader: F) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<Unit>>,
    {
        if self.is_ready() { return Ok(()); }
        let _build = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_ready() { return Ok(()); }
        tracing::info!("initializing search service");
        let units = loader()?;
        self.rebuild(&units)?;
        if self.is_ready() { Ok(()) } else { Err(Error::NotInitialized) }
    }

    /// Top `top_k` units for `query`; `weights` defaults to the configured pair.
    pub fn search(&self, query: &str, top_k: usize, weights: Option<SearchWeights>) -> Result<Vec<RankedUnit>> {
        let index = self.current().ok_or(Error::NotInitialized)?;
        let weights = weights.unwrap_or(self.options.weights);
        if !weights.is_valid() {
            return Err(Error::InvalidArgument(format!(
                "weights must be finite and non-negative, got {}/{}",
                weights.semantic, weights.lexical
            )));
        }
        let pool = top_k.saturating_mul(self.options.oversample);
        index.query(query, top_k, pool, weights).map_err(Error::retrieval)
    }

    fn rebuild(&self, units: &[Unit]) -> Result<IndexStats> {
        let built = HybridIndex::build(units, &self.options.splitter, self.embedder.clone(), self.options.batch_size)
            .map_err(Error::retrieval)?;
        let stats = built.as_ref().map(HybridIndex::stats).unwrap_or(IndexStats { units: units.len(), ..IndexStats::default() });
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = built.map(Arc::new);
        Ok(stats)
    }

    fn current(&self) -> Option<Arc<HybridIndex>> {
        self.index.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
