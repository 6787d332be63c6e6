//! Configuration management for domainfinder
//!
//! Configuration is loaded from `./config/domainfinder.toml` (or `--config`).
//! The template embedded below is what `--init` writes.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration file path relative to working directory
pub const CONFIG_PATH: &str = "./config/domainfinder.toml";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = include_str!("../config/domainfinder.toml");

pub const ENV_SEARCH_API_KEY: &str = "DOMAINFINDER_SEARCH_API_KEY";
pub const ENV_SEARCH_ENGINE_ID: &str = "DOMAINFINDER_SEARCH_ENGINE_ID";
pub const ENV_ORGANIZATION_API_KEY: &str = "DOMAINFINDER_ORGANIZATION_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid URL in '{field}': {url}")]
    InvalidUrl { field: String, url: String },

    #[error("Configuration field '{field}' cannot be empty")]
    EmptyRequired { field: String },

    #[error("Configuration field '{field}' is {value}, expected {expected}")]
    OutOfRange {
        field: String,
        value: u64,
        expected: String,
    },
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub autocomplete: AutocompleteConfig,
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Web search discovery source (Google Custom Search JSON API)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub search_engine_id: String,
    pub max_results: usize,
    #[serde(default = "default_safe_search")]
    pub safe: String,
}

impl SearchConfig {
    /// Whether the source can be queried at all
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.api_key.is_empty() && !self.search_engine_id.is_empty()
    }
}

/// Autocomplete discovery source (Clearbit company suggest)
#[derive(Debug, Clone, Deserialize)]
pub struct AutocompleteConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub endpoint: String,
}

/// Organization lookup source (FullContact company lookup)
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

impl OrganizationConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// What to do when the organization lookup for one candidate fails
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentFailurePolicy {
    /// Drop the failed domain and keep ranking the rest
    #[default]
    Skip,
    /// Fail the whole query
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,
    #[serde(default)]
    pub enrichment_failure_policy: EnrichmentFailurePolicy,
    #[serde(default = "default_true")]
    pub abort_on_no_candidates: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            enrichment_concurrency: default_enrichment_concurrency(),
            enrichment_failure_policy: EnrichmentFailurePolicy::default(),
            abort_on_no_candidates: true,
        }
    }
}

/// Batch (file input) processing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Input rows held in memory at once
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Queries resolved concurrently within a chunk
    #[serde(default = "default_batch_parallel")]
    pub parallel: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            parallel: default_batch_parallel(),
        }
    }
}

/// Per-source request rates (0 = unlimited)
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub search_requests_per_second: u32,
    #[serde(default)]
    pub autocomplete_requests_per_second: u32,
    #[serde(default)]
    pub organization_requests_per_second: u32,
}

fn default_true() -> bool {
    true
}

fn default_safe_search() -> String {
    "high".to_string()
}

fn default_enrichment_concurrency() -> usize {
    3
}

fn default_chunk_size() -> usize {
    500
}

fn default_batch_parallel() -> usize {
    1
}

impl AppConfig {
    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill secrets from `DOMAINFINDER_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Fill secrets from an arbitrary key lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = value(ENV_SEARCH_API_KEY) {
            self.search.api_key = key;
        }
        if let Some(id) = value(ENV_SEARCH_ENGINE_ID) {
            self.search.search_engine_id = id;
        }
        if let Some(key) = value(ENV_ORGANIZATION_API_KEY) {
            self.organization.api_key = key;
        }
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.user_agent.is_empty() {
            return Err(ConfigError::EmptyRequired {
                field: "http.user_agent".to_string(),
            });
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::EmptyRequired {
                field: "http.request_timeout_secs".to_string(),
            });
        }

        validate_url("search.endpoint", &self.search.endpoint)?;
        validate_url("autocomplete.endpoint", &self.autocomplete.endpoint)?;
        validate_url("organization.endpoint", &self.organization.endpoint)?;

        // Custom Search returns at most 10 items per request
        validate_range("search.max_results", self.search.max_results, 1, 10)?;
        validate_range(
            "resolution.enrichment_concurrency",
            self.resolution.enrichment_concurrency,
            1,
            64,
        )?;
        validate_range("batch.chunk_size", self.batch.chunk_size, 1, 100_000)?;
        validate_range("batch.parallel", self.batch.parallel, 1, 64)?;

        Ok(())
    }

    /// Create default configuration file at the given location
    pub fn create_default_config(path: &Path) -> Result<PathBuf, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;

        Ok(path.to_path_buf())
    }

    /// Check if stdin is a TTY (interactive terminal)
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal()
    }

    /// Prompt user to create default config (only in interactive mode)
    pub fn prompt_create_config(path: &Path) -> Result<Option<PathBuf>, ConfigError> {
        if !Self::is_interactive() {
            return Ok(None);
        }

        eprint!("Configuration file not found. Create default config at {}? [Y/n] ", path.display());
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input.is_empty() || input == "y" || input == "yes" {
            let path = Self::create_default_config(path)?;
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::EmptyRequired {
            field: field.to_string(),
        });
    }

    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field: field.to_string(),
            url: value.to_string(),
        }),
    }
}

fn validate_range(field: &str, value: usize, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field: field.to_string(),
            value: value as u64,
            expected: format!("{}..={}", min, max),
        });
    }
    Ok(())
}
