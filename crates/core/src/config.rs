//! # Catalog Configuration
//!
//! Defaults for the store and the HTTP loader, overridable from the
//! environment (`STOREFRONT_*`).

use crate::catalog::paginate::DEFAULT_PAGE_SIZE;
use std::time::Duration;

/// Default catalog endpoint
pub const DEFAULT_SOURCE_URL: &str = "https://closet-recruiting-api.azurewebsites.net/api/data";

/// Invalid configuration value
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}

/// Store and loader settings
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Catalog endpoint (URL) or JSON file path
    pub source_url: String,
    /// Items per page
    pub page_size: usize,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// User agent sent by the HTTP loader
    pub user_agent: String,
    /// Compute `has_more` from the filtered length after a fetch instead of
    /// forcing it to true
    pub strict_has_more: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(10),
            user_agent: format!("storefront/{}", env!("CARGO_PKG_VERSION")),
            strict_has_more: false,
        }
    }
}

impl CatalogConfig {
    /// Defaults with the given page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    /// Defaults overridden by `STOREFRONT_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("STOREFRONT_SOURCE_URL").filter(|v| !v.trim().is_empty()) {
            config.source_url = url.trim().to_string();
        }
        if let Some(value) = lookup("STOREFRONT_PAGE_SIZE") {
            config.page_size = parse_positive("STOREFRONT_PAGE_SIZE", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_TIMEOUT_SECS") {
            let secs = parse_positive("STOREFRONT_TIMEOUT_SECS", &value)?;
            config.request_timeout = Duration::from_secs(secs as u64);
        }
        if let Some(value) = lookup("STOREFRONT_STRICT_HAS_MORE") {
            config.strict_has_more = parse_flag("STOREFRONT_STRICT_HAS_MORE", &value)?;
        }

        Ok(config)
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}
