//! Candidate domain discovery from a web search source and an autocomplete
//! source.

pub mod autocomplete;
pub mod fetcher;
pub mod search;

pub use autocomplete::{ClearbitAutocomplete, NoopAutocompleteSource};
pub use fetcher::CandidateFetcher;
pub use search::{GoogleCustomSearch, NoopSearchSource};

use async_trait::async_trait;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::SourceError;

/// One web search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub link: String,
    /// Host shown with the result (e.g. `www.microsoft.com`)
    pub display_host: String,
}

impl SearchHit {
    pub fn new(link: impl Into<String>, display_host: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            display_host: display_host.into(),
        }
    }
}

/// A general web search returning ranked links
#[async_trait]
pub trait SearchSource: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SourceError>;
}

/// A company-name autocomplete returning domain suggestions
#[async_trait]
pub trait AutocompleteSource: Send + Sync {
    fn name(&self) -> &str;

    async fn suggest(&self, query: &str) -> Result<Vec<String>, SourceError>;
}

/// Build the HTTP client shared by the remote sources
pub fn build_http_client(config: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.as_str())
        .build()
}

/// Map a transport error, keeping timeouts distinguishable
pub(crate) fn request_error(error: reqwest::Error, timeout: Duration) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout(timeout)
    } else {
        SourceError::Request(error)
    }
}

/// Read the body of a response, turning non-success statuses into errors
pub(crate) async fn success_body(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<String, SourceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::Http {
            status: status.as_u16(),
            body,
        });
    }

    response.text().await.map_err(|e| request_error(e, timeout))
}
