//! Google Custom Search JSON API source.
//!
//! Popular companies rank their own site highly, so web search is the primary
//! discovery source. The free tier is heavily throttled; when it fails the
//! autocomplete source still produces candidates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{request_error, success_body, SearchHit, SearchSource};
use crate::config::SearchConfig;
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    /// Absent when the search has no results
    #[serde(default)]
    items: Vec<CustomSearchItem>,
}

#[derive(Debug, Deserialize)]
struct CustomSearchItem {
    link: Option<String>,
    #[serde(rename = "displayLink")]
    display_link: Option<String>,
}

pub struct GoogleCustomSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    search_engine_id: String,
    safe: String,
    timeout: Duration,
}

impl GoogleCustomSearch {
    pub fn new(client: Client, config: &SearchConfig, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            search_engine_id: config.search_engine_id.clone(),
            safe: config.safe.clone(),
            timeout,
        }
    }

    fn parse_response(body: &str) -> Result<Vec<SearchHit>, SourceError> {
        let response: CustomSearchResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| match (item.link, item.display_link) {
                (Some(link), Some(display_host)) => Some(SearchHit { link, display_host }),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl SearchSource for GoogleCustomSearch {
    fn name(&self) -> &str {
        "google-custom-search"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SourceError> {
        debug!("Querying search API for '{}' (max {} results)", query, max_results);

        let num = max_results.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("safe", self.safe.as_str()),
                ("cx", self.search_engine_id.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let body = success_body(response, self.timeout).await?;
        let hits = Self::parse_response(&body)?;
        debug!("Search API returned {} results for '{}'", hits.len(), query);
        Ok(hits)
    }
}

/// Search source used when no API key is configured
pub struct NoopSearchSource;

#[async_trait]
impl SearchSource for NoopSearchSource {
    fn name(&self) -> &str {
        "search-disabled"
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>, SourceError> {
        warn!("Web search is disabled or has no API key configured; relying on autocomplete only");
        Ok(Vec::new())
    }
}
