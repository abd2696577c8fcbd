//! # Catalog Loaders
//!
//! One full-collection retrieval per call. No filter or paging
//! parameters are ever sent; all of that happens in the store.

use crate::config::CatalogConfig;
use crate::models::Item;
use async_trait::async_trait;
use std::path::PathBuf;

/// Failure to retrieve or decode the catalog
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("could not decode catalog: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not read catalog file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Transport(e.to_string()),
        }
    }
}

/// Source of the raw item list
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    /// Fetch the whole catalog, in upstream order
    async fn fetch_catalog(&self) -> Result<Vec<Item>, FetchError>;

    /// Human-readable description of the source, for logs
    fn describe(&self) -> String;
}

/// Loader for a JSON endpoint
pub struct HttpCatalogLoader {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogLoader {
    /// Build a client from the config's URL, timeout and user agent
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            url: config.source_url.clone(),
        })
    }
}

#[async_trait]
impl CatalogLoader for HttpCatalogLoader {
    async fn fetch_catalog(&self) -> Result<Vec<Item>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        // Decode separately so malformed bodies surface as Decode, not Transport
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Loader for a JSON array stored on disk
pub struct FileCatalogLoader {
    path: PathBuf,
}

impl FileCatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogLoader for FileCatalogLoader {
    async fn fetch_catalog(&self) -> Result<Vec<Item>, FetchError> {
        let content = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory loader returning a fixed result
pub struct StaticCatalogLoader {
    result: Result<Vec<Item>, String>,
}

impl StaticCatalogLoader {
    /// Always succeed with these items
    pub fn new(items: Vec<Item>) -> Self {
        Self { result: Ok(items) }
    }

    /// Always fail with a transport error carrying this message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl CatalogLoader for StaticCatalogLoader {
    async fn fetch_catalog(&self) -> Result<Vec<Item>, FetchError> {
        self.result.clone().map_err(FetchError::Transport)
    }

    fn describe(&self) -> String {
        match &self.result {
            Ok(items) => format!("static ({} items)", items.len()),
            Err(_) => "static (failing)".to_string(),
        }
    }
}

/// Pick a loader for a source string: http(s) URLs go over the network,
/// anything else is treated as a file path.
pub fn loader_for_source(config: &CatalogConfig) -> Result<Box<dyn CatalogLoader>, FetchError> {
    let source = config.source_url.as_str();
    if source.starts_with("http://") || source.starts_with("https://") {
        Ok(Box::new(HttpCatalogLoader::new(config)?))
    } else {
        Ok(Box::new(FileCatalogLoader::new(source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricingOption;
    use std::io::Write;

    #[tokio::test]
    async fn test_static_loader() {
        let loader = StaticCatalogLoader::new(vec![Item::new("1", "Hat", PricingOption::Free)]);
        let items = loader.fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 1);

        let failing = StaticCatalogLoader::failing("offline");
        let err = failing.fetch_catalog().await.unwrap_err();
        assert_eq!(err.to_string(), "request failed: offline");
    }

    #[tokio::test]
    async fn test_file_loader_reads_upstream_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id":"a","title":"Wool Coat","imagePath":"a.png","pricingOption":"Paid","price":120,"user":{{"name":"kim"}}}},
                {{"id":"b","title":"Scarf","imagePath":"b.png","pricingOption":"Free"}}
            ]"#
        )
        .unwrap();

        let loader = FileCatalogLoader::new(file.path());
        let items = loader.fetch_catalog().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].pricing_option, PricingOption::Paid);
        assert_eq!(items[0].owner_name.as_deref(), Some("kim"));
        assert_eq!(items[1].pricing_option, PricingOption::Free);
    }

    #[tokio::test]
    async fn test_file_loader_errors() {
        let missing = FileCatalogLoader::new("/nonexistent/catalog.json");
        assert!(matches!(missing.fetch_catalog().await, Err(FetchError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not":"an array"}}"#).unwrap();
        let malformed = FileCatalogLoader::new(file.path());
        assert!(matches!(malformed.fetch_catalog().await, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_loader_for_source() {
        let http = loader_for_source(&CatalogConfig::default()).unwrap();
        assert!(http.describe().starts_with("https://"));

        let config = CatalogConfig {
            source_url: "fixtures/catalog.json".to_string(),
            ..CatalogConfig::default()
        };
        let file = loader_for_source(&config).unwrap();
        assert_eq!(file.describe(), "fixtures/catalog.json");
    }
}
