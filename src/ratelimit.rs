//! Rate-Limit Header Parser (spec component G).
//!
//! Scans a response's `anthropic-ratelimit-<field>-<resource>` headers,
//! grouping by `<resource>` (e.g. `requests`, `tokens`, `input-tokens`),
//! and separately reads the bare `retry-after` header. Grounded on the
//! teacher's use of `reqwest::header::HeaderMap` for provider-probe
//! headers in `config.rs`, generalized here to a multi-header scan.

use crate::types::ProviderRateLimit;
use reqwest::header::HeaderMap;

const HEADER_PREFIX: &str = "anthropic-ratelimit-";

/// Parses every `anthropic-ratelimit-*` header present into one
/// [`ProviderRateLimit`] per distinct resource name, plus the `retry-after`
/// hint in seconds if present.
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> (Vec<ProviderRateLimit>, Option<u64>) {
    let mut by_resource: std::collections::BTreeMap<String, ProviderRateLimit> = std::collections::BTreeMap::new();

    for (name, value) in headers.iter() {
        let name = name.as_str();
        let Some(rest) = name.strip_prefix(HEADER_PREFIX) else {
            continue;
        };
        // The field suffix (`limit`/`remaining`/`reset`) is always a single
        // word, but the resource name itself may contain hyphens (e.g.
        // `input-tokens`), so split off the last component as the field.
        let Some((resource, field)) = rest.rsplit_once('-') else {
            continue;
        };
        let Ok(value) = value.to_str() else { continue };

        let entry = by_resource.entry(resource.to_string()).or_insert_with(|| ProviderRateLimit {
            name: resource.to_string(),
            limit: None,
            remaining: None,
            resets_at: None,
        });

        match field {
            "limit" => entry.limit = value.parse().ok(),
            "remaining" => entry.remaining = value.parse().ok(),
            "reset" => {
                entry.resets_at = chrono::DateTime::parse_from_rfc3339(value)
                    .ok()
                    .map(|dt| dt.with_timezone(&chrono::Utc));
            }
            _ => log::warn!("unrecognized rate-limit header field {field:?} for resource {resource:?}"),
        }
    }

    let retry_after = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    (by_resource.into_values().collect(), retry_after)
}
