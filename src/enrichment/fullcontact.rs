//! FullContact company lookup.
//!
//! FullContact returns organization keywords such as `["Mobile", "Devops"]`,
//! which become the tags compared against the user's categories.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{EnrichmentSource, OrganizationProfile};
use crate::config::OrganizationConfig;
use crate::discovery::{request_error, success_body};
use crate::error::SourceError;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    name: Option<String>,
    /// Often null for smaller companies
    #[serde(default)]
    keywords: Option<Vec<String>>,
}

pub struct FullContactLookup {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl FullContactLookup {
    pub fn new(client: Client, config: &OrganizationConfig, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout,
        }
    }

    fn parse_response(body: &str) -> Result<OrganizationProfile, SourceError> {
        let response: LookupResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::MalformedResponse(e.to_string()))?;

        let organization = response
            .organization
            .ok_or_else(|| SourceError::MalformedResponse("missing 'organization'".to_string()))?;

        Ok(OrganizationProfile {
            name: organization.name,
            keywords: organization.keywords.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl EnrichmentSource for FullContactLookup {
    fn name(&self) -> &str {
        "fullcontact"
    }

    async fn lookup(&self, domain: &str) -> Result<OrganizationProfile, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("domain", domain), ("apiKey", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        match response.status() {
            // Profile is being compiled; FullContact asks callers to retry later
            StatusCode::ACCEPTED => Err(SourceError::Queued),
            StatusCode::NOT_FOUND => Err(SourceError::NotFound),
            _ => {
                let body = success_body(response, self.timeout).await?;
                Self::parse_response(&body)
            }
        }
    }
}
