//! Search endpoint client.
//!
//! The explorer fetches raw candidates through the [`TrackSource`] trait so
//! the session can be driven by the real HTTP endpoint or by an in-memory
//! source in tests.
//!
//! # Wire contract
//!
//! ```text
//! GET {base_url}/tracks/search?q=<query>&limit=<n>
//! Cache-Control: no-store
//!
//! 2xx  → JSON array of raw track records
//! else → ExplorerError::Status
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ExplorerError;

/// A provider of raw track candidates for a query.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetch up to `limit` raw records matching `query`.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Value>, ExplorerError>;
}

/// [`TrackSource`] backed by the Notethrough HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTrackSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTrackSource {
    pub fn new(config: &ApiConfig) -> Result<Self, ExplorerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExplorerError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn search_url(&self) -> String {
        format!("{}/tracks/search", self.base_url)
    }
}

#[async_trait]
impl TrackSource for HttpTrackSource {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Value>, ExplorerError> {
        let url = self.search_url();
        debug!(%url, query, limit, "requesting search candidates");

        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("limit", limit.as_str())])
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        match body {
            Value::Array(records) => Ok(records),
            other => Err(ExplorerError::Decode(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
