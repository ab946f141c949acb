//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all, via
//! [`Config::minimal`]) yields a working client pointed at
//! `http://localhost:8000`.
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! timeout_secs = 60
//!
//! [registry]
//! poll_interval_secs = 3
//!
//! [query]
//! top_k = 3
//!
//! [selection]
//! on_missing = "retain"   # or "clear"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Per-request timeout for the HTTP client.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistryConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            greeting: default_greeting(),
            fallback_message: default_fallback_message(),
        }
    }
}

fn default_top_k() -> u32 {
    3
}
fn default_greeting() -> String {
    "你好！我已經分析完文件了，有什麼我可以幫你的嗎？".to_string()
}
fn default_fallback_message() -> String {
    "系統處理時發生錯誤，請確認 Ollama 是否已啟動。".to_string()
}

/// What happens to the selected document id when a refresh no longer
/// contains it.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingSelection {
    /// Keep the id; it resolves to no selection until the document reappears.
    #[default]
    Retain,
    /// Drop the id on the next reconcile.
    Clear,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SelectionConfig {
    #[serde(default)]
    pub on_missing: MissingSelection,
}

impl Config {
    /// Defaults for every section.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.registry.poll_interval_secs)
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            anyhow::bail!("backend.base_url must not be empty");
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "backend.base_url must start with http:// or https://, got '{}'",
                url
            );
        }
        if self.backend.timeout_secs == 0 {
            anyhow::bail!("backend.timeout_secs must be > 0");
        }
        if self.registry.poll_interval_secs == 0 {
            anyhow::bail!("registry.poll_interval_secs must be > 0");
        }
        if !(1..=10).contains(&self.query.top_k) {
            anyhow::bail!("query.top_k must be in [1, 10]");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
