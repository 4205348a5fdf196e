//! Shared helpers.

use axum::http::HeaderMap;
use chrono::Utc;
use url::Url;

/// Current unix time in seconds.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Whether `candidate` is an absolute http(s) URL with the same origin as `site_url`.
pub fn is_same_origin(candidate: &str, site_url: &str) -> bool {
    let (Ok(candidate), Ok(site)) = (Url::parse(candidate), Url::parse(site_url)) else {
        return false;
    };

    matches!(candidate.scheme(), "http" | "https") && candidate.origin() == site.origin()
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
