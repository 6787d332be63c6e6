use std::path::PathBuf;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

/// Parsed JSON body of a recorded API response
pub fn api_response(relative: &str) -> serde_json::Value {
    let content = std::fs::read_to_string(fixture_path(relative))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", relative));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse JSON fixture {}: {}", relative, e))
}

pub fn search_response(query: &str) -> serde_json::Value {
    api_response(&format!("search/{}.json", query))
}

pub fn autocomplete_response(query: &str) -> serde_json::Value {
    api_response(&format!("autocomplete/{}.json", query))
}

pub fn organization_response(domain: &str) -> serde_json::Value {
    api_response(&format!("organization/{}.json", domain))
}
