//! signdb-embed
//!
//! Embedding providers behind [`signdb_core::traits::Embedder`]:
//! - `gemini`: remote Gemini embeddings (needs an API key)
//! - `local`: XLM-RoBERTa family encoder run locally with candle
//! - `fake`: deterministic hash embedder for tests and offline development
//!
//! `APP_USE_FAKE_EMBEDDINGS=1` forces the fake provider regardless of config.

use anyhow::Result;

use signdb_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use signdb_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod gemini;
pub mod local;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use gemini::GeminiEmbedder;
pub use local::LocalModelEmbedder;
pub use pool::masked_mean_l2;

pub fn fake_embeddings_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the configured provider. Missing credentials fail here, not on first use.
pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_embeddings_forced() {
        tracing::info!("using FakeEmbedder (APP_USE_FAKE_EMBEDDINGS)");
        return Ok(Box::new(FakeEmbedder::new(settings.dim)?));
    }
    let embedder: Box<dyn Embedder> = match settings.provider {
        EmbeddingProviderKind::Gemini => Box::new(GeminiEmbedder::new(settings)?),
        EmbeddingProviderKind::Local => Box::new(LocalModelEmbedder::new(settings)?),
        EmbeddingProviderKind::Fake => Box::new(FakeEmbedder::new(settings.dim)?),
    };
    tracing::info!(embedder = embedder.embedder_id(), "embedding provider ready");
    Ok(embedder)
}

pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    embedder_from_settings(&EmbeddingSettings::default())
}
