//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Environment variable overriding `api.base_url`.
pub const ENV_BASE_URL: &str = "STORY_API_BASE_URL";

/// Environment variable overriding `auth.token_file`.
pub const ENV_TOKEN_FILE: &str = "STORY_API_TOKEN_FILE";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend location and HTTP behavior
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential storage
    #[serde(default)]
    pub auth: AuthConfig,

    /// Query cache behavior
    #[serde(default)]
    pub query: QueryConfig,

    /// Search bar behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// Infinite-scroll feed behavior
    #[serde(default)]
    pub feed: FeedConfig,

    /// Toast notifications
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.api.base_url = base_url;
        }
        if let Some(token_file) = lookup(ENV_TOKEN_FILE) {
            self.auth.token_file = PathBuf::from(token_file);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(AppError::config("api.base_url must not be empty"));
        }
        let parsed = Url::parse(base_url)
            .map_err(|e| AppError::config(format!("api.base_url '{base_url}' is invalid: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "api.base_url '{base_url}' cannot be used as a base URL"
            )));
        }
        if self.api.resource.trim_matches('/').is_empty() {
            return Err(AppError::validation("api.resource is empty"));
        }
        if self.api.timeout_secs == Some(0) {
            return Err(AppError::validation("api.timeout_secs must be > 0 when set"));
        }
        if self.search.per_page == 0 {
            return Err(AppError::validation("search.per_page must be > 0"));
        }
        if self.feed.page_size == 0 {
            return Err(AppError::validation("feed.page_size must be > 0"));
        }
        Ok(())
    }
}

/// Backend location and HTTP behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Versioned API root, e.g. `http://localhost:3000/api/v1`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Collection path under the API root
    #[serde(default = "defaults::resource")]
    pub resource: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds; unset means requests never time out
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            resource: defaults::resource(),
            user_agent: defaults::user_agent(),
            timeout_secs: None,
        }
    }
}

/// Where the bearer token lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "defaults::token_file")]
    pub token_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: defaults::token_file(),
        }
    }
}

/// Query cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How long a successful entry is served without refetching
    #[serde(default)]
    pub stale_time_secs: u64,

    /// Extra attempts after a failed request
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Extra attempts after a failed mutation
    #[serde(default)]
    pub mutation_retries: u32,

    /// How long a settled entry is kept before it is dropped
    #[serde(default = "defaults::cache_time_secs")]
    pub cache_time_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: 0,
            retries: defaults::retries(),
            mutation_retries: 0,
            cache_time_secs: defaults::cache_time_secs(),
        }
    }
}

/// Search bar behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a draft is committed
    #[serde(default = "defaults::debounce_ms")]
    pub debounce_ms: u64,

    /// Result count requested for the dropdown
    #[serde(default = "defaults::page_size")]
    pub per_page: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::debounce_ms(),
            per_page: defaults::page_size(),
        }
    }
}

/// Infinite-scroll feed behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
        }
    }
}

/// Toast notifications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Show a failure toast for every mutation, not only updates
    #[serde(default)]
    pub report_all_failures: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

impl LoggingConfig {
    /// Default log filter; `verbose` forces `debug`.
    pub fn filter(&self, verbose: bool) -> &str {
        if verbose { "debug" } else { &self.level }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn base_url() -> String {
        "http://localhost:3000/api/v1".into()
    }
    pub fn resource() -> String {
        "products".into()
    }
    pub fn user_agent() -> String {
        concat!("story-search/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn token_file() -> PathBuf {
        PathBuf::from(".story/token")
    }
    pub fn retries() -> u32 {
        1
    }
    pub fn cache_time_secs() -> u64 {
        300
    }
    pub fn debounce_ms() -> u64 {
        500
    }
    pub fn page_size() -> u32 {
        8
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
