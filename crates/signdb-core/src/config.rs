//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (with `__` as the nesting separator). The legacy variables `GEMINI_API_KEY`,
//! `REACT_APP_SUPABASE_URL` and `REACT_APP_SUPABASE_ANON_KEY` are honoured as
//! fallbacks. Provides helpers to expand `~` and `${VAR}` and to resolve
//! relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::SearchWeights;
use crate::variants::{VariantSplitter, DEFAULT_VARIANT_MARKER};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        // A missing .env is the normal case outside local development.
        let _ = dotenvy::dotenv();

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["GEMINI_API_KEY"]).map(|_| "embedding.api_key".into()))
            .merge(Env::raw().only(&["REACT_APP_SUPABASE_URL"]).map(|_| "store.url".into()))
            .merge(Env::raw().only(&["REACT_APP_SUPABASE_ANON_KEY"]).map(|_| "store.api_key".into()))
            .merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(env_name)?;
        Ok(config)
    }

    /// Build a config from an explicit figment, e.g. in tests.
    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config = Self { figment: Figment::from(Serialized::defaults(Settings::default())).merge(figment) };
        config.validate_for_env("test")?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        if matches!(env, "prod" | "production") && settings.embedding.provider == EmbeddingProviderKind::Fake {
            return Err(Error::InvalidConfig("the fake embedding provider is not allowed in production".into()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub embedding: EmbeddingSettings,
    pub search: SearchSettings,
    pub gesture: GestureSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        self.search.validate()?;
        self.gesture.validate()?;
        if self.embedding.batch_size == 0 {
            return Err(Error::InvalidConfig("embedding.batch_size must be > 0".into()));
        }
        if self.embedding.dim == 0 {
            return Err(Error::InvalidConfig("embedding.dim must be > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Base URL of the hosted database, without the `/rest/v1` suffix.
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { url: None, api_key: None, timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Gemini,
    Local,
    Fake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Directory holding `tokenizer.json`, `config.json` and weights for the local model.
    pub model_dir: Option<String>,
    pub batch_size: usize,
    /// Dimension of the fake (hash) provider.
    pub dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Gemini,
            api_key: None,
            model: "text-embedding-004".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model_dir: None,
            batch_size: 64,
            dim: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub semantic_weight: f32,
    pub lexical_weight: f32,
    /// Candidate pool per channel is `oversample * top_k`.
    pub oversample: usize,
    pub default_top_k: usize,
    pub variant_marker: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let weights = SearchWeights::default();
        Self {
            semantic_weight: weights.semantic,
            lexical_weight: weights.lexical,
            oversample: 3,
            default_top_k: 3,
            variant_marker: DEFAULT_VARIANT_MARKER.to_string(),
        }
    }
}

impl SearchSettings {
    pub fn weights(&self) -> SearchWeights {
        SearchWeights::new(self.semantic_weight, self.lexical_weight)
    }

    pub fn splitter(&self) -> Result<VariantSplitter, Error> {
        VariantSplitter::new(&self.variant_marker)
    }

    fn validate(&self) -> Result<(), Error> {
        if !self.weights().is_valid() {
            return Err(Error::InvalidConfig(format!(
                "search weights must be finite and non-negative, got {}/{}",
                self.semantic_weight, self.lexical_weight
            )));
        }
        if self.oversample < 3 {
            return Err(Error::InvalidConfig(format!("search.oversample must be >= 3, got {}", self.oversample)));
        }
        if self.default_top_k == 0 {
            return Err(Error::InvalidConfig("search.default_top_k must be > 0".into()));
        }
        self.splitter().map(|_| ())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub smoothing_alpha: f32,
    /// Display labels in model output order.
    pub labels: Vec<String>,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.5,
            labels: ["ban than", "cha me", "nha", "ten", "ong"].into_iter().map(String::from).collect(),
        }
    }
}

impl GestureSettings {
    fn validate(&self) -> Result<(), Error> {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "gesture.smoothing_alpha must be in (0, 1], got {}",
                self.smoothing_alpha
            )));
        }
        if self.labels.is_empty() {
            return Err(Error::InvalidConfig("gesture.labels must not be empty".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
