//! Error types for the streaming tool-use orchestration core.

use thiserror::Error;

use crate::types::ProviderRateLimit;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Tool execution error
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// 429 response, or generically a server-signaled rate limit.
    ///
    /// Carries the parsed `anthropic-ratelimit-*` records and the
    /// `retry-after` hint so callers can back off intelligently.
    #[error("Rate limited{}", retry_after_suffix(.retry_after_seconds))]
    RateLimited {
        rate_limits: Vec<ProviderRateLimit>,
        retry_after_seconds: Option<u64>,
    },

    /// 529 response, or an in-stream `overloaded_error` event.
    #[error("Provider is overloaded")]
    Overloaded,

    /// 413 response: the request body exceeded the provider's size limit.
    #[error("Request payload too large")]
    RequestTooLarge,

    /// Malformed JSON in a `data:` line of the SSE body.
    #[error("Failed to decode {provider} chunk: {source}")]
    ChunkDecode {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transport-level failure sending the request (connection, unmapped 4xx/5xx).
    #[error("Request to {model} failed: {message}")]
    ProviderRequest { model: String, message: String },

    /// An in-stream `error` event of any type other than `overloaded_error`.
    #[error("Provider returned an error: {0}")]
    ProviderResponse(String),

    /// The Tool Driver's recursion depth bound (`max_steps`) was reached.
    #[error("Maximum tool call chain depth exceeded")]
    MaxStepsExceeded,

    /// A citation record carried none of the recognized positional signatures.
    #[error("Citation record has no recognized positional signature")]
    InvalidCitation,

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

fn retry_after_suffix(seconds: &Option<u64>) -> String {
    match seconds {
        Some(s) => format!(" (retry after {s}s)"),
        None => String::new(),
    }
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new tool error
    pub fn tool(msg: impl Into<String>) -> Self {
        Error::Tool(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new other error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a timeout error
    pub fn timeout() -> Self {
        Error::Timeout
    }

    /// Create a rate-limited error from parsed headers.
    pub fn rate_limited(
        rate_limits: Vec<ProviderRateLimit>,
        retry_after_seconds: Option<u64>,
    ) -> Self {
        Error::RateLimited {
            rate_limits,
            retry_after_seconds,
        }
    }

    /// Create a provider-request error.
    pub fn provider_request(model: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ProviderRequest {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a provider-response error from an in-stream `error` event.
    pub fn provider_response(error_type: &str, message: &str) -> Self {
        Error::ProviderResponse(format!("{error_type} {message}"))
    }

    /// Create a chunk-decode error.
    pub fn chunk_decode(provider: impl Into<String>, source: serde_json::Error) -> Self {
        Error::ChunkDecode {
            provider: provider.into(),
            source,
        }
    }
}

/// Map an HTTP status code from a failed send into the error taxonomy
/// (spec.md §4.H). `model` and `body` are used only for the fallback
/// `ProviderRequest` variant's message.
pub fn classify_http_status(
    status: reqwest::StatusCode,
    model: &str,
    body: &str,
    rate_limits: Vec<ProviderRateLimit>,
    retry_after_seconds: Option<u64>,
) -> Error {
    match status.as_u16() {
        429 => Error::rate_limited(rate_limits, retry_after_seconds),
        529 => Error::Overloaded,
        413 => Error::RequestTooLarge,
        _ => Error::provider_request(model, format!("HTTP {status}: {body}")),
    }
}

/// Map an in-stream `error` event into the error taxonomy (spec.md §4.D/§4.H).
pub fn classify_stream_error(error_type: &str, message: &str) -> Error {
    if error_type == "overloaded_error" {
        Error::Overloaded
    } else {
        Error::provider_response(error_type, message)
    }
}
