use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSource;
use async_trait::async_trait;
use popcorn_config::OmdbConfig;
use popcorn_models::{MovieDetail, SearchResult};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const USER_AGENT: &str = concat!("popcorn/", env!("CARGO_PKG_VERSION"));

/// Client for the OMDb API.
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::Configuration("OMDb API key is not set".to_string()));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        info!(base_url = %base_url, "OMDb client ready");
        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &OmdbConfig, api_key: String) -> Result<Self, SourceError> {
        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        api::search_titles(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn get_details(&self, imdb_id: &str) -> Result<MovieDetail, SourceError> {
        api::get_title(&self.client, &self.base_url, &self.api_key, imdb_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_api_key() {
        let result = OmdbClient::new("https://www.omdbapi.com/".to_string(), "  ".to_string(), Duration::from_secs(5));
        assert!(matches!(result, Err(SourceError::Configuration(_))));
    }

    #[test]
    fn test_from_config() {
        let client = OmdbClient::from_config(&OmdbConfig::default(), "38c94ee0".to_string()).unwrap();
        assert_eq!(client.base_url(), "https://www.omdbapi.com/");
        assert_eq!(client.source_name(), "omdb");
    }
}
