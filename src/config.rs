//! TOML configuration parsing and validation.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080"
//! timeout_secs = 10
//! limit = 20
//!
//! [search]
//! debounce_ms = 200
//! cache_capacity = 128
//! # cache_ttl_secs = 300
//!
//! [storage]
//! path = "./data/search-state.json"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use global_search_core::controller::ControllerOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_limit() -> u32 {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: None,
        }
    }
}

/// Upper bound for `search.debounce_ms`.
pub const MAX_DEBOUNCE_MS: u64 = 60_000;
/// Upper bound for `search.cache_ttl_secs` (30 days).
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn default_debounce_ms() -> u64 {
    200
}
fn default_cache_capacity() -> usize {
    128
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/search-state.json")
}

impl SearchConfig {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            debounce_ms: i64::try_from(self.debounce_ms.min(MAX_DEBOUNCE_MS)).unwrap_or(i64::MAX),
            cache_capacity: self.cache_capacity,
            cache_ttl_ms: self
                .cache_ttl_secs
                .map(|s| s.min(MAX_CACHE_TTL_SECS))
                .and_then(|s| i64::try_from(s).ok())
                .and_then(|s| s.checked_mul(1000)),
        }
    }
}

impl Config {
    /// Defaults used when no config file exists: a local backend and
    /// the state file under `./data`.
    pub fn minimal() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_secs: default_timeout_secs(),
                limit: default_limit(),
            },
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate api
    let base = config.api.base_url.as_str();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("api.base_url must start with http:// or https://, got '{}'", base);
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }
    if config.api.limit < 1 {
        anyhow::bail!("api.limit must be >= 1");
    }

    // Validate search
    if config.search.cache_capacity == 0 {
        anyhow::bail!("search.cache_capacity must be > 0");
    }
    if config.search.debounce_ms > MAX_DEBOUNCE_MS {
        anyhow::bail!(
            "search.debounce_ms must be <= {}, got {}",
            MAX_DEBOUNCE_MS,
            config.search.debounce_ms
        );
    }
    match config.search.cache_ttl_secs {
        Some(0) => anyhow::bail!("search.cache_ttl_secs must be > 0 when set"),
        Some(ttl) if ttl > MAX_CACHE_TTL_SECS => anyhow::bail!(
            "search.cache_ttl_secs must be <= {}, got {}",
            MAX_CACHE_TTL_SECS,
            ttl
        ),
        _ => {}
    }

    Ok(())
}
