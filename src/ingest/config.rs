// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::providers::feed::{FeedSource, DEFAULT_MAX_BODY_BYTES};
use crate::ingest::types::NewsSource;

pub const ENV_SOURCES_PATH: &str = "NEWS_SOURCES_PATH";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 60;
pub const DEFAULT_USER_AGENT: &str = concat!("biosimilar-news-monitor/", env!("CARGO_PKG_VERSION"));

/// One configured publisher feed.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceCfg {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default)]
    pub sources: Vec<SourceCfg>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_lookback_days")]
    pub default_lookback_days: i64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Feed bodies above this size fail the source.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
fn default_lookback_days() -> i64 {
    DEFAULT_LOOKBACK_DAYS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl SourcesConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Build one HTTP feed source per configured publisher, sharing a single client.
    pub fn build_sources(&self) -> Result<Vec<Box<dyn NewsSource>>> {
        let client = reqwest::Client::builder()
            .timeout(self.fetch_timeout())
            .user_agent(self.user_agent.as_str())
            .build()
            .context("building feed http client")?;

        Ok(self
            .sources
            .iter()
            .map(|s| {
                Box::new(
                    FeedSource::from_url(&s.name, &s.url, client.clone())
                        .with_max_body_bytes(self.max_body_bytes),
                ) as Box<dyn NewsSource>
            })
            .collect())
    }
}

/// Load sources from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourcesConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load sources using env var + fallbacks:
/// 1) $NEWS_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) empty configuration (no publishers)
pub fn load_sources_default() -> Result<SourcesConfig> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        } else {
            return Err(anyhow!("{ENV_SOURCES_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    tracing::warn!(target: "ingest", "no sources config found; running with zero publishers");
    Ok(SourcesConfig::default())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<SourcesConfig> {
    let parsed = if hint_ext == "json" {
        serde_json::from_str::<SourcesConfig>(s).context("parsing sources json")
    } else {
        toml::from_str::<SourcesConfig>(s)
            .context("parsing sources toml")
            .or_else(|e| serde_json::from_str::<SourcesConfig>(s).map_err(|_| e))
    }?;
    Ok(clean(parsed))
}

/// Trim names/urls, drop empty entries, keep the first entry per publisher name.
fn clean(mut cfg: SourcesConfig) -> SourcesConfig {
    let mut seen = std::collections::HashSet::new();
    cfg.sources = cfg
        .sources
        .into_iter()
        .filter_map(|s| {
            let name = s.name.trim().to_string();
            let url = s.url.trim().to_string();
            if name.is_empty() || url.is_empty() {
                return None;
            }
            seen.insert(name.to_ascii_lowercase())
                .then_some(SourceCfg { name, url })
        })
        .collect();
    cfg
}
