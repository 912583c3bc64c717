//! PostgREST client for the hosted catalogue database.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Duration;

use signdb_core::config::StoreSettings;
use signdb_core::Error;

use crate::query::TableQuery;
use crate::store::RecordSource;

pub struct RestSource {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl RestSource {
    /// Fails with [`Error::InvalidConfig`] when the URL or key is missing.
    pub fn new(settings: &StoreSettings) -> signdb_core::Result<Self> {
        let base_url = required(settings.url.as_deref(), "store.url (REACT_APP_SUPABASE_URL)")?;
        let api_key = required(settings.api_key.as_deref(), "store.api_key (REACT_APP_SUPABASE_ANON_KEY)")?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key })
    }

    pub fn base_url(&self) -> &str { &self.base_url }
}

fn required(value: Option<&str>, name: &str) -> signdb_core::Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidConfig(format!("{name} is required")))
}

impl RecordSource for RestSource {
    fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>> {
        let url = format!("{}/rest/v1/{}", self.base_url, query.table);
        tracing::debug!(table = %query.table, "fetching records");
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .query(&query.to_params())
            .send()
            .with_context(|| format!("request to {} failed", query.table))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(anyhow!("{} returned {}: {}", query.table, status, body.chars().take(200).collect::<String>()));
        }
        response.json().with_context(|| format!("failed to parse {} records", query.table))
    }
}
