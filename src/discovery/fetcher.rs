//! Parallel candidate fetch across both discovery sources.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{AutocompleteSource, SearchHit, SearchSource};
use crate::domain_utils;
use crate::error::SourceError;
use crate::rate_limit::{RateLimitContext, SharedRateLimiter};

/// Queries both discovery sources for a name and merges their domains.
///
/// Source failures (errors, timeouts, malformed payloads) degrade to an empty
/// list for that source; `fetch_candidates` never fails.
pub struct CandidateFetcher {
    search: Arc<dyn SearchSource>,
    autocomplete: Arc<dyn AutocompleteSource>,
    max_results: usize,
    timeout: Duration,
    search_limiter: SharedRateLimiter,
    autocomplete_limiter: SharedRateLimiter,
}

impl CandidateFetcher {
    pub fn new(
        search: Arc<dyn SearchSource>,
        autocomplete: Arc<dyn AutocompleteSource>,
        max_results: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            search,
            autocomplete,
            max_results,
            timeout,
            search_limiter: SharedRateLimiter::unlimited(),
            autocomplete_limiter: SharedRateLimiter::unlimited(),
        }
    }

    pub fn with_rate_limits(mut self, limits: &RateLimitContext) -> Self {
        self.search_limiter = limits.search_limiter.clone();
        self.autocomplete_limiter = limits.autocomplete_limiter.clone();
        self
    }

    /// Unique candidate domains for a normalized query name, search results first
    pub async fn fetch_candidates(&self, query_name: &str) -> Vec<String> {
        let (from_search, from_autocomplete) = tokio::join!(
            self.from_search(query_name),
            self.from_autocomplete(query_name),
        );

        let candidates = merge_candidates(from_search, from_autocomplete);
        info!("Found {} candidate domains for '{}'", candidates.len(), query_name);
        candidates
    }

    async fn from_search(&self, query_name: &str) -> Vec<String> {
        self.search_limiter.acquire().await;

        let call = self.search.search(query_name, self.max_results);
        match with_timeout(self.timeout, call).await {
            Ok(hits) => filter_search_hits(query_name, hits),
            Err(e) => {
                warn!("{} unavailable for '{}': {}", self.search.name(), query_name, e);
                Vec::new()
            }
        }
    }

    async fn from_autocomplete(&self, query_name: &str) -> Vec<String> {
        self.autocomplete_limiter.acquire().await;

        let call = self.autocomplete.suggest(query_name);
        match with_timeout(self.timeout, call).await {
            Ok(domains) => domains
                .iter()
                .filter_map(|d| domain_utils::normalize_domain(d))
                .collect(),
            Err(e) => {
                warn!("{} unavailable for '{}': {}", self.autocomplete.name(), query_name, e);
                Vec::new()
            }
        }
    }
}

/// Bound a source call by `timeout`, reporting expiry as `SourceError::Timeout`
pub(crate) async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    }
}

/// Keep search results whose display host mentions the query and turn their
/// links into bare domains. News articles about the company are dropped this way.
pub fn filter_search_hits(query_name: &str, hits: Vec<SearchHit>) -> Vec<String> {
    let needle = query_name.to_lowercase();

    hits.into_iter()
        .filter(|hit| hit.display_host.to_lowercase().contains(&needle))
        .filter_map(|hit| {
            let domain = domain_utils::normalize_domain(&hit.link);
            if domain.is_none() {
                debug!("Skipping unparsable search link: {}", hit.link);
            }
            domain
        })
        .collect()
}

/// Concatenate search then autocomplete domains and drop repeats, keeping the
/// first occurrence of each
pub fn merge_candidates(from_search: Vec<String>, from_autocomplete: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();

    from_search
        .into_iter()
        .chain(from_autocomplete)
        .filter_map(|d| domain_utils::normalize_domain(&d))
        .filter(|d| seen.insert(d.clone()))
        .collect()
}
