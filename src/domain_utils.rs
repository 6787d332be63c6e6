use url::Url;

/// Normalize a link or host into a bare, lowercase domain.
///
/// Accepts full URLs (`https://www.microsoft.com/en-us`) as well as bare hosts
/// (`www.Microsoft.com`). Scheme, port, path and a leading `www.` are removed.
/// Returns `None` when no host can be extracted.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{}", trimmed))
    };

    let host = parsed.ok()?.host_str()?.to_lowercase();
    let host = host.trim_end_matches('.');
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// The part of a domain before its first dot (e.g. `guru-technologies.com` -> `guru-technologies`)
pub fn domain_root(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

/// Lowercase a free-text company name and remove all whitespace
pub fn normalize_query(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<String>()
        .to_lowercase()
}
