//! Configuration helpers for resolving the Anthropic endpoint and API key.
//!
//! Narrowed from the teacher's multi-provider (LM Studio/Ollama/llama.cpp/
//! vLLM) resolution table down to the single hosted provider this crate
//! targets, keeping the same environment-variable-overrides-fallback
//! resolution shape.
//!
//! ## Environment Variables
//!
//! - `ANTHROPIC_BASE_URL`: overrides the base URL
//! - `ANTHROPIC_API_KEY`: overrides the API key

use std::env;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Resolves the base URL: `ANTHROPIC_BASE_URL` env var, then `fallback`,
/// then the hosted default.
///
/// # Examples
///
/// ```rust
/// use prism_stream::config::resolve_base_url;
///
/// let url = resolve_base_url(Some("https://my-proxy.internal"));
/// ```
pub fn resolve_base_url(fallback: Option<&str>) -> String {
    if let Ok(url) = env::var("ANTHROPIC_BASE_URL") {
        return url;
    }
    fallback.unwrap_or(DEFAULT_BASE_URL).to_string()
}

/// Resolves the API key: `ANTHROPIC_API_KEY` env var, then `fallback`.
///
/// Returns `None` if neither source provides a key, leaving the caller to
/// surface `AgentOptionsBuilder::build`'s `Error::Config` for a missing key.
pub fn resolve_api_key(fallback: Option<&str>) -> Option<String> {
    if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
        return Some(key);
    }
    fallback.map(|s| s.to_string())
}
