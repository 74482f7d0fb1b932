//! Configuration management for the Industry Leaders tools.
//!
//! All commands share one configuration file at `~/.leaders/config.json`.
//! Every field is optional; a missing file means "all defaults".
//!
//! # Configuration Priority
//!
//! 1. Environment variables (LEADERS_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `LEADERS_CONFIG` → path of the config file itself
//! - `LEADERS_LOG_LEVEL` → observability.log_level
//! - `LEADERS_LOG_FORMAT` → observability.log_format
//! - `LEADERS_FMP_BASE_URL` → fmp.base_url
//! - `LEADERS_WATCHLIST_PATH` → watchlist.path
//!
//! # Secrets
//!
//! The FMP API key is resolved by name: `secrets.fmp_api_key` first, then the
//! environment variable whose *name* is `fmp.api_key_env` (default `API_KEY`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".leaders"),
        |dirs| dirs.home_dir().join(".leaders"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    std::env::var_os("LEADERS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("config.json"))
}

// ============================================================================
// FMP (Financial Modeling Prep) Configuration
// ============================================================================

/// Settings for the financial-data HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FmpConfig {
    /// API base URL, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of lookups in flight during bulk operations
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Index whose constituents seed a screen (sp500, nasdaq, dowjones)
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for FmpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            index: default_index(),
        }
    }
}

impl FmpConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://financialmodelingprep.com/api/v3".to_string()
}

fn default_api_key_env() -> String {
    "API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_index() -> String {
    "sp500".to_string()
}

/// Indices with a constituents endpoint.
pub const SUPPORTED_INDICES: &[&str] = &["sp500", "nasdaq", "dowjones"];

// ============================================================================
// Screener Configuration
// ============================================================================

/// Defaults for the ROE screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerSettings {
    /// ROE threshold in percent; a period passes when strictly above it
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Inclusion policy: "all" or the minimum number of passing periods
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Number of annual periods fetched per company
    #[serde(default = "default_max_periods")]
    pub max_periods: usize,

    /// Only screen the first N constituents (None = all)
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            policy: default_policy(),
            max_periods: default_max_periods(),
            limit: None,
        }
    }
}

fn default_threshold() -> f64 {
    15.0
}

fn default_policy() -> String {
    "all".to_string()
}

fn default_max_periods() -> usize {
    10
}

// ============================================================================
// Watch-list Configuration
// ============================================================================

/// Where the Industry Leaders watch-list is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistConfig {
    #[serde(default = "default_watchlist_path")]
    pub path: PathBuf,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            path: default_watchlist_path(),
        }
    }
}

fn default_watchlist_path() -> PathBuf {
    config_dir().join("industry_leaders.json")
}

// ============================================================================
// Observability / Secrets
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Secrets stored directly in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmp_api_key: Option<String>,
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fmp: FmpConfig,

    #[serde(default)]
    pub screener: ScreenerSettings,

    #[serde(default)]
    pub watchlist: WatchlistConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration (default path or `explicit`) with environment overrides.
    pub fn load_with_env(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides read through `lookup` (name → value).
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("LEADERS_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("LEADERS_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Some(url) = lookup("LEADERS_FMP_BASE_URL") {
            self.fmp.base_url = url;
        }
        if let Some(path) = lookup("LEADERS_WATCHLIST_PATH") {
            self.watchlist.path = PathBuf::from(path);
        }
    }

    /// Resolve the FMP API key from the config file or the process environment.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    /// Resolve the FMP API key, reading environment variables through `lookup`.
    ///
    /// The environment is always queried by the variable *name* in
    /// `fmp.api_key_env`, never by a key value.
    pub fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        if let Some(key) = &self.secrets.fmp_api_key {
            return non_blank(key, "secrets.fmp_api_key");
        }

        let env_var = &self.fmp.api_key_env;
        match lookup(env_var) {
            Some(key) => non_blank(&key, env_var),
            None => Err(ConfigError::MissingApiKey {
                env_var: env_var.clone(),
            }),
        }
    }
}

fn non_blank(key: &str, source_name: &str) -> Result<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::BlankApiKey {
            source_name: source_name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Tests
// ============================================================================
