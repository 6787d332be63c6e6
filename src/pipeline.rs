//! Resolution of one company name: fetch, enrich, score, rank.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::company::{Company, Query};
use crate::config::{AppConfig, EnrichmentFailurePolicy};
use crate::discovery::{
    build_http_client, AutocompleteSource, CandidateFetcher, ClearbitAutocomplete,
    GoogleCustomSearch, NoopAutocompleteSource, NoopSearchSource, SearchSource,
};
use crate::enrichment::{EnrichmentSource, FullContactLookup, NoopEnrichmentSource, ProfileEnricher};
use crate::error::ResolveError;
use crate::rate_limit::RateLimitContext;
use crate::{ranking, scoring};

pub struct ResolutionPipeline {
    fetcher: CandidateFetcher,
    enricher: ProfileEnricher,
    policy: EnrichmentFailurePolicy,
}

impl ResolutionPipeline {
    pub fn new(fetcher: CandidateFetcher, enricher: ProfileEnricher, policy: EnrichmentFailurePolicy) -> Self {
        Self {
            fetcher,
            enricher,
            policy,
        }
    }

    /// Wire the HTTP sources described by the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = build_http_client(&config.http).context("Failed to create HTTP client")?;
        let timeout = config.http.request_timeout();
        let limits = RateLimitContext::from_config(&config.rate_limit);
        limits.log_config();

        let search: Arc<dyn SearchSource> = if config.search.is_configured() {
            Arc::new(GoogleCustomSearch::new(client.clone(), &config.search, timeout))
        } else {
            Arc::new(NoopSearchSource)
        };

        let autocomplete: Arc<dyn AutocompleteSource> = if config.autocomplete.enabled {
            Arc::new(ClearbitAutocomplete::new(client.clone(), &config.autocomplete, timeout))
        } else {
            Arc::new(NoopAutocompleteSource)
        };

        let organization: Arc<dyn EnrichmentSource> = if config.organization.is_configured() {
            Arc::new(FullContactLookup::new(client, &config.organization, timeout))
        } else {
            warn!("No organization API key configured; companies will not be enriched");
            Arc::new(NoopEnrichmentSource)
        };

        debug!(
            "Sources: search={}, autocomplete={}, organization={}",
            search.name(),
            autocomplete.name(),
            organization.name()
        );

        let fetcher = CandidateFetcher::new(search, autocomplete, config.search.max_results, timeout)
            .with_rate_limits(&limits);
        let enricher = ProfileEnricher::new(organization, config.resolution.enrichment_concurrency, timeout)
            .with_rate_limiter(limits.organization_limiter.clone());

        Ok(Self::new(fetcher, enricher, config.resolution.enrichment_failure_policy))
    }

    /// Resolve one query into companies ordered from best to worst match
    pub async fn resolve_one(&self, query: &Query) -> Result<Vec<Company>, ResolveError> {
        if query.name.is_empty() {
            return Err(ResolveError::InvalidQuery);
        }

        let candidates = self.fetcher.fetch_candidates(&query.name).await;
        if candidates.is_empty() {
            return Err(ResolveError::NoCandidatesFound {
                query: query.raw_name.clone(),
            });
        }

        let companies = self.enricher.enrich_all(candidates, self.policy).await?;
        let ranked = ranking::rank(scoring::score_all(companies, query));

        info!(
            "Resolved '{}': {} companies, best match {}",
            query.raw_name,
            ranked.len(),
            ranked.first().map(|c| c.domain.as_str()).unwrap_or("none")
        );
        Ok(ranked)
    }

    /// Convenience wrapper building the query from a name and categories
    pub async fn resolve<S: AsRef<str>>(&self, name: &str, categories: &[S]) -> Result<Vec<Company>, ResolveError> {
        let query = Query::new(name).with_categories(categories.iter().map(|c| c.as_ref()));
        self.resolve_one(&query).await
    }
}
