//! Organization metadata enrichment for candidate domains.

pub mod fullcontact;

pub use fullcontact::FullContactLookup;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::company::Company;
use crate::config::EnrichmentFailurePolicy;
use crate::discovery::fetcher::with_timeout;
use crate::error::{ResolveError, SourceError};
use crate::rate_limit::SharedRateLimiter;

/// Organization metadata reported for a domain
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationProfile {
    pub name: Option<String>,
    pub keywords: Vec<String>,
}

/// Looks up organization metadata for a domain.
///
/// Implementations must report "still processing" as `SourceError::Queued`
/// and unknown domains as `SourceError::NotFound`.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, domain: &str) -> Result<OrganizationProfile, SourceError>;
}

/// Enrichment source used when no organization API key is configured.
/// Every domain gets an empty profile.
pub struct NoopEnrichmentSource;

#[async_trait]
impl EnrichmentSource for NoopEnrichmentSource {
    fn name(&self) -> &str {
        "enrichment-disabled"
    }

    async fn lookup(&self, _domain: &str) -> Result<OrganizationProfile, SourceError> {
        Ok(OrganizationProfile::default())
    }
}

/// Builds `Company` records from candidate domains with bounded concurrency
pub struct ProfileEnricher {
    source: Arc<dyn EnrichmentSource>,
    concurrency: usize,
    timeout: Duration,
    limiter: SharedRateLimiter,
}

impl ProfileEnricher {
    pub fn new(source: Arc<dyn EnrichmentSource>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            timeout,
            limiter: SharedRateLimiter::unlimited(),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: SharedRateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Look up one domain. Queued, not-found and transport failures are errors.
    pub async fn enrich(&self, domain: &str) -> Result<Company, SourceError> {
        self.limiter.acquire().await;

        let profile = with_timeout(self.timeout, self.source.lookup(domain)).await?;
        let name = profile.name.unwrap_or_default();
        debug!("Enriched {}: '{}' with {} keywords", domain, name, profile.keywords.len());

        Ok(Company::new(name, domain, &profile.keywords))
    }

    /// Enrich every domain, at most `concurrency` lookups in flight.
    ///
    /// Output keeps the input order. Under `Skip` failed domains are dropped;
    /// under `Abort` the first failure (in input order) fails the whole call.
    pub async fn enrich_all(
        &self,
        domains: Vec<String>,
        policy: EnrichmentFailurePolicy,
    ) -> Result<Vec<Company>, ResolveError> {
        let lookups = stream::iter(domains)
            .map(|domain| async move {
                let result = self.enrich(&domain).await;
                (domain, result)
            })
            .buffered(self.concurrency);
        futures::pin_mut!(lookups);

        let mut companies = Vec::new();
        while let Some((domain, result)) = lookups.next().await {
            match result {
                Ok(company) => companies.push(company),
                Err(source) => match policy {
                    EnrichmentFailurePolicy::Skip => {
                        warn!("Skipping {}: organization lookup failed: {}", domain, source);
                    }
                    EnrichmentFailurePolicy::Abort => {
                        return Err(ResolveError::EnrichmentFailed { domain, source });
                    }
                },
            }
        }

        Ok(companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Profiles by domain; domains mapped to `None` are queued, unknown
    /// domains are not found.
    struct MapSource {
        profiles: HashMap<String, Option<OrganizationProfile>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MapSource {
        fn new(entries: Vec<(&str, Option<(&str, Vec<&str>)>)>) -> Self {
            let profiles = entries
                .into_iter()
                .map(|(domain, profile)| {
                    let profile = profile.map(|(name, keywords)| OrganizationProfile {
                        name: Some(name.to_string()),
                        keywords: keywords.into_iter().map(String::from).collect(),
                    });
                    (domain.to_string(), profile)
                })
                .collect();
            Self {
                profiles,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EnrichmentSource for MapSource {
        fn name(&self) -> &str {
            "map"
        }

        async fn lookup(&self, domain: &str) -> Result<OrganizationProfile, SourceError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.profiles.get(domain) {
                Some(Some(profile)) => Ok(profile.clone()),
                Some(None) => Err(SourceError::Queued),
                None => Err(SourceError::NotFound),
            }
        }
    }

    fn enricher(source: Arc<MapSource>, concurrency: usize) -> ProfileEnricher {
        ProfileEnricher::new(source, concurrency, Duration::from_secs(1))
    }

    fn domains(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_enrich_builds_company() {
        let source = Arc::new(MapSource::new(vec![(
            "microsoft.com",
            Some(("Microsoft", vec!["Global", "Cloud Computing"])),
        )]));

        let company = enricher(source, 1).enrich("microsoft.com").await.unwrap();
        assert_eq!(company.name, "Microsoft");
        assert_eq!(company.domain, "microsoft.com");
        assert_eq!(company.tags.len(), 3);
        assert!(company.tags.contains("computing"));
    }

    #[tokio::test]
    async fn test_enrich_queued_is_error() {
        let source = Arc::new(MapSource::new(vec![("slow.com", None)]));
        let result = enricher(source, 1).enrich("slow.com").await;
        assert!(matches!(result, Err(SourceError::Queued)));
    }

    #[tokio::test]
    async fn test_enrich_all_skips_failures_in_order() {
        let source = Arc::new(MapSource::new(vec![
            ("a.com", Some(("A", vec![]))),
            ("queued.com", None),
            ("c.com", Some(("C", vec![]))),
        ]));

        let companies = enricher(source, 3)
            .enrich_all(domains(&["a.com", "queued.com", "missing.com", "c.com"]), EnrichmentFailurePolicy::Skip)
            .await
            .unwrap();

        let names: Vec<&str> = companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_enrich_all_abort_reports_first_failure() {
        let source = Arc::new(MapSource::new(vec![
            ("a.com", Some(("A", vec![]))),
            ("queued.com", None),
        ]));

        let result = enricher(source, 2)
            .enrich_all(domains(&["a.com", "queued.com", "missing.com"]), EnrichmentFailurePolicy::Abort)
            .await;

        match result {
            Err(ResolveError::EnrichmentFailed { domain, source }) => {
                assert_eq!(domain, "queued.com");
                assert!(matches!(source, SourceError::Queued));
            }
            other => panic!("Expected EnrichmentFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrich_all_respects_concurrency() {
        let entries: Vec<(&str, Option<(&str, Vec<&str>)>)> = vec![
            ("a.com", Some(("A", vec![]))),
            ("b.com", Some(("B", vec![]))),
            ("c.com", Some(("C", vec![]))),
            ("d.com", Some(("D", vec![]))),
            ("e.com", Some(("E", vec![]))),
        ];
        let source = Arc::new(MapSource::new(entries));

        let companies = enricher(source.clone(), 2)
            .enrich_all(domains(&["a.com", "b.com", "c.com", "d.com", "e.com"]), EnrichmentFailurePolicy::Skip)
            .await
            .unwrap();

        assert_eq!(companies.len(), 5);
        assert!(source.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_noop_source_gives_empty_profile() {
        let enricher = ProfileEnricher::new(Arc::new(NoopEnrichmentSource), 3, Duration::from_secs(1));
        let company = enricher.enrich("acme.com").await.unwrap();
        assert_eq!(company.name, "");
        assert!(company.tags.is_empty());
    }
}
