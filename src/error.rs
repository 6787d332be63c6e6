use std::time::Duration;
use thiserror::Error;

/// Failure of a single call to a remote source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The lookup was accepted but the record is still being built
    #[error("lookup queued, try again later")]
    Queued,

    #[error("no record found")]
    NotFound,

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure of a whole resolution for one query
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("company name is empty")]
    InvalidQuery,

    #[error("No domains found from APIs for '{query}', check rate limits")]
    NoCandidatesFound { query: String },

    #[error("organization lookup failed for {domain}: {source}")]
    EnrichmentFailed {
        domain: String,
        #[source]
        source: SourceError,
    },
}

impl ResolveError {
    /// Whether this error indicates a systemic outage rather than a per-name problem
    pub fn is_no_candidates(&self) -> bool {
        matches!(self, ResolveError::NoCandidatesFound { .. })
    }
}
