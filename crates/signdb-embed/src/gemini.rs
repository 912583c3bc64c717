//! Remote embedding provider backed by the Gemini `batchEmbedContents` API.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use signdb_core::config::EmbeddingSettings;
use signdb_core::traits::Embedder;
use signdb_core::Error;

/// Requests per `batchEmbedContents` call accepted by the API.
const MAX_BATCH: usize = 100;

pub struct GeminiEmbedder {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
    dim: usize,
    id: String,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiEmbedder {
    /// Fails fast with [`Error::InvalidConfig`] when no API key is configured.
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig("GEMINI_API_KEY (embedding.api_key) is required for hybrid search".into()))?;
        let model = settings.model.trim_start_matches("models/").to_string();
        let dim = if model == "gemini-embedding-001" { 3072 } else { 768 };
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        let id = format!("gemini:{model}:d{dim}");
        Ok(Self { client, api_key, model, base_url: settings.base_url.trim_end_matches('/').to_string(), dim, id })
    }

    fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/models/{}:batchEmbedContents", self.base_url, self.model);
        let model = format!("models/{}", self.model);
        let body = BatchRequest {
            requests: texts
                .iter()
                .map(|t| EmbedRequest { model: &model, content: Content { parts: vec![Part { text: t }] } })
                .collect(),
        };
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| anyhow!("embedding request failed: {e}"))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("embedding API error {status}: {body}"));
        }
        let parsed: BatchResponse = response.json().context("failed to parse embedding response")?;
        if parsed.embeddings.len() != texts.len() {
            return Err(anyhow!("embedding API returned {} vectors for {} texts", parsed.embeddings.len(), texts.len()));
        }
        Ok(parsed.embeddings.into_iter().map(|e| l2_normalize(e.values)).collect())
    }
}

impl Embedder for GeminiEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { 2048 }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            out.extend(self.request(batch)?);
        }
        Ok(out)
    }
}

pub(crate) fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 { for x in &mut v { *x /= norm; } }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_at_construction() {
        let settings = EmbeddingSettings { api_key: None, ..EmbeddingSettings::default() };
        let err = GeminiEmbedder::new(&settings).err().expect("must fail");
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))));

        let blank = EmbeddingSettings { api_key: Some("  ".into()), ..EmbeddingSettings::default() };
        assert!(GeminiEmbedder::new(&blank).is_err());
    }

    #[test]
    fn model_prefix_is_normalized() {
        let settings = EmbeddingSettings {
            api_key: Some("k".into()),
            model: "models/text-embedding-004".into(),
            ..EmbeddingSettings::default()
        };
        let embedder = GeminiEmbedder::new(&settings).expect("embedder");
        assert_eq!(embedder.embedder_id(), "gemini:text-embedding-004:d768");
        assert_eq!(embedder.dim(), 768);
    }

    #[test]
    fn request_body_shape() {
        let model = "models/text-embedding-004".to_string();
        let text = "wave hand".to_string();
        let body = BatchRequest { requests: vec![EmbedRequest { model: &model, content: Content { parts: vec![Part { text: &text }] } }] };
        let json = serde_json::to_value(&body).expect("json");
        assert_eq!(json["requests"][0]["content"]["parts"][0]["text"], "wave hand");
        assert_eq!(json["requests"][0]["model"], "models/text-embedding-004");
    }

    #[test]
    fn normalizes_vectors() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }
}
