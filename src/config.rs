// src/config.rs

//! Startup configuration and client assembly.
//!
//! Misconfiguration is reported here, before any request is made.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::query::QueryClient;
use crate::services::{LogNotifier, Notifier, StoryApi};
use crate::storage::{FileTokenStore, TokenStore};
use crate::utils::http::{HttpClient, ReqwestTransport, Transport};

/// Load configuration, apply environment overrides and validate.
///
/// A missing or unreadable file falls back to defaults; invalid values do not.
pub fn load_config(path: &Path) -> Result<Config> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with an explicit variable lookup.
pub fn load_config_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        Config::load_or_default(path)
    };
    config.apply_overrides(lookup);
    config.validate()?;
    log::debug!(
        "Using API {} (resource '{}')",
        config.api.base_url,
        config.api.resource
    );
    Ok(config)
}

/// Token store at the configured location.
pub fn token_store(config: &Config) -> Arc<FileTokenStore> {
    Arc::new(FileTokenStore::new(&config.auth.token_file))
}

/// Wire a query client from explicit parts.
pub fn build_client(
    config: &Config,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<QueryClient> {
    let http = HttpClient::new(transport, tokens);
    let api = StoryApi::new(http, &config.api)?;
    Ok(QueryClient::new(api, notifier, config))
}

/// Production wiring: reqwest transport, file token store, logged toasts.
pub fn connect(config: &Config) -> Result<QueryClient> {
    let transport = Arc::new(ReqwestTransport::new(&config.api)?);
    build_client(config, transport, token_store(config), Arc::new(LogNotifier))
}
