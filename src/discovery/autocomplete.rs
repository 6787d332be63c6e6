//! Clearbit company autocomplete source.
//!
//! Needs no API key and is lightly throttled, but only knows companies that
//! Clearbit has a record for.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{request_error, success_body, AutocompleteSource};
use crate::config::AutocompleteConfig;
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct Suggestion {
    domain: Option<String>,
}

pub struct ClearbitAutocomplete {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl ClearbitAutocomplete {
    pub fn new(client: Client, config: &AutocompleteConfig, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
        }
    }

    fn parse_response(body: &str) -> Result<Vec<String>, SourceError> {
        let suggestions: Vec<Suggestion> = serde_json::from_str(body)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;

        Ok(suggestions
            .into_iter()
            .filter_map(|s| s.domain)
            .filter(|d| !d.trim().is_empty())
            .collect())
    }
}

#[async_trait]
impl AutocompleteSource for ClearbitAutocomplete {
    fn name(&self) -> &str {
        "clearbit-autocomplete"
    }

    async fn suggest(&self, query: &str) -> Result<Vec<String>, SourceError> {
        debug!("Querying autocomplete API for '{}'", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let body = success_body(response, self.timeout).await?;
        let domains = Self::parse_response(&body)?;
        debug!("Autocomplete API suggested {} domains for '{}'", domains.len(), query);
        Ok(domains)
    }
}

/// Autocomplete source used when autocomplete is disabled in the configuration
pub struct NoopAutocompleteSource;

#[async_trait]
impl AutocompleteSource for NoopAutocompleteSource {
    fn name(&self) -> &str {
        "autocomplete-disabled"
    }

    async fn suggest(&self, _query: &str) -> Result<Vec<String>, SourceError> {
        Ok(Vec::new())
    }
}
