//! Application configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `~/.config/leaguecache/config.json`, if present
//! 3. Environment variables (`LEAGUECACHE_API_BASE_URL`,
//!    `LEAGUECACHE_CACHE_DURATION_MS`)

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{DEFAULT_CAPACITY_BYTES, DEFAULT_TTL};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "leaguecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "https://www.thesportsdb.com/api/v1/json/3";

pub const ENV_API_BASE_URL: &str = "LEAGUECACHE_API_BASE_URL";
pub const ENV_CACHE_DURATION_MS: &str = "LEAGUECACHE_CACHE_DURATION_MS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not find {0} directory")]
    NoDirectory(&'static str),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Cache entry lifetime (24 hours)
    pub cache_duration_ms: u64,
    pub request_timeout_ms: u64,
    /// Retries after the first failed league-list request
    pub list_retries: u32,
    /// Retries after the first failed badge request
    pub badge_retries: u32,
    /// First retry delay; doubles on each further retry
    pub retry_backoff_ms: u64,
    pub search_debounce_ms: u64,
    pub cache_capacity_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_duration_ms: DEFAULT_TTL.as_millis() as u64,
            request_timeout_ms: 10_000,
            list_retries: 2,
            badge_retries: 1,
            retry_backoff_ms: 1_000,
            search_debounce_ms: 300,
            cache_capacity_bytes: DEFAULT_CAPACITY_BYTES,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    /// A broken config file is logged and ignored.
    pub fn load() -> Self {
        let mut config = match Self::load_file() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        config
    }

    fn load_file() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from a variable lookup. Invalid values are logged
    /// and skipped.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup(ENV_CACHE_DURATION_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.cache_duration_ms = ms,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_CACHE_DURATION_MS),
            }
        }
    }

    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirectory("config"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf, ConfigError> {
        let cache_dir = dirs::cache_dir().ok_or(ConfigError::NoDirectory("cache"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_duration_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
