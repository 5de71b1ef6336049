/// Shared request plumbing for API handlers
use axum::http::HeaderMap;

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::to_string))
}

/// Base origin for composed share URLs: the request Host header when
/// present, the configured public origin otherwise
pub fn share_origin(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get("host")
        .and_then(|h| h.to_str().ok())
        .map(|host| format!("https://{}", host))
        .unwrap_or_else(|| fallback.to_string())
}
