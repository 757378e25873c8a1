//! TOML configuration.
//!
//! Every section is optional; an absent file means built-in defaults (see
//! [`load_config_or_default`]). `NOTETHROUGH_API_URL` overrides
//! `api.base_url` either way.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::explorer::DEFAULT_RESULT_LIMIT;
use crate::filters::ExplorerFilters;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "NOTETHROUGH_API_URL";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerConfig {
    /// Number of raw candidates requested per search.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    /// Number of ranked results kept.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Filter preset applied on session start and on reset.
    #[serde(default)]
    pub filters: ExplorerFilters,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            candidate_limit: default_candidate_limit(),
            result_limit: default_result_limit(),
            min_query_len: default_min_query_len(),
            filters: ExplorerFilters::default(),
        }
    }
}

fn default_candidate_limit() -> usize {
    100
}
fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}
fn default_min_query_len() -> usize {
    2
}

impl Config {
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if base.is_empty() {
            bail!("api.base_url must not be empty");
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            bail!("api.base_url must start with http:// or https:// (got '{}')", base);
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be > 0");
        }

        if self.explorer.candidate_limit == 0 {
            bail!("explorer.candidate_limit must be >= 1");
        }
        if self.explorer.result_limit == 0 {
            bail!("explorer.result_limit must be >= 1");
        }
        if self.explorer.min_query_len == 0 {
            bail!("explorer.min_query_len must be >= 1");
        }

        self.explorer
            .filters
            .validate()
            .context("Invalid explorer.filters preset")?;

        Ok(())
    }
}

/// Parse configuration from TOML text, then apply env overrides and validate.
pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    let mut config = Config::default();
    config.apply_env();
    config.validate()?;
    Ok(config)
}
