use domainfinder::config::AppConfig;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/customsearch/v1";
pub const AUTOCOMPLETE_PATH: &str = "/v1/companies/suggest";
pub const ORGANIZATION_PATH: &str = "/v2/company/lookup.json";

pub const SEARCH_KEY: &str = "test-search-key";
pub const ORGANIZATION_KEY: &str = "test-organization-key";

/// One mock server standing in for all three remote APIs. Requests with no
/// matching mock get a 404, which every source treats as a failure.
pub struct MockApis {
    pub server: MockServer,
}

impl MockApis {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Search results for query `q`
    pub async fn search(&self, q: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("q", q))
            .and(query_param("key", SEARCH_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn search_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"error": {"code": status}})))
            .mount(&self.server)
            .await;
    }

    pub async fn autocomplete(&self, query: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(AUTOCOMPLETE_PATH))
            .and(query_param("query", query))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Autocomplete answering after `delay`
    pub async fn autocomplete_delayed(&self, body: serde_json::Value, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(AUTOCOMPLETE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    pub async fn organization(&self, domain: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(ORGANIZATION_PATH))
            .and(query_param("domain", domain))
            .and(query_param("apiKey", ORGANIZATION_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// FullContact's "profile is being built, retry later" answer
    pub async fn organization_queued(&self, domain: &str) {
        Mock::given(method("GET"))
            .and(path(ORGANIZATION_PATH))
            .and(query_param("domain", domain))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status": 202,
                "message": "Queued for search. Please retry your query within the next few minutes."
            })))
            .mount(&self.server)
            .await;
    }

    pub fn config_toml(&self, failure_policy: &str, request_timeout_secs: u64) -> String {
        let uri = self.server.uri();
        format!(
            r#"
[http]
user_agent = "domainfinder-tests"
request_timeout_secs = {request_timeout_secs}

[search]
enabled = true
endpoint = "{uri}{SEARCH_PATH}"
api_key = "{SEARCH_KEY}"
search_engine_id = "test-engine"
max_results = 7
safe = "high"

[autocomplete]
enabled = true
endpoint = "{uri}{AUTOCOMPLETE_PATH}"

[organization]
endpoint = "{uri}{ORGANIZATION_PATH}"
api_key = "{ORGANIZATION_KEY}"

[resolution]
enrichment_concurrency = 3
enrichment_failure_policy = "{failure_policy}"
abort_on_no_candidates = true

[batch]
chunk_size = 2
parallel = 1
"#
        )
    }

    pub fn config(&self) -> AppConfig {
        self.config_with("skip", 2)
    }

    pub fn config_with(&self, failure_policy: &str, request_timeout_secs: u64) -> AppConfig {
        AppConfig::from_toml(&self.config_toml(failure_policy, request_timeout_secs))
            .expect("mock config should be valid")
    }
}
