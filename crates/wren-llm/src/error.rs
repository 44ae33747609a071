//! LLM-related error types, including the retryable/permanent
//! classification the retry transport dispatches on.

use thiserror::Error;

/// Errors that can occur issuing or parsing an LLM call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// The HTTP request itself could not be sent.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// HTTP 429 or 408: retryable rate-limit / timeout response.
    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, from `Retry-After` if present.
        retry_after_secs: Option<u64>,
    },

    /// HTTP 401 or 403: non-retryable authentication/authorization failure.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// HTTP 400: non-retryable invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 5xx or another configured retryable status.
    #[error("service error (status {status}): {body}")]
    ServiceError {
        /// The HTTP status code.
        status: u16,
        /// The response body, if any.
        body: String,
    },

    /// A network-level failure (connection reset, timeout, DNS, ...).
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be parsed as the expected shape.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// The requested model is not one this provider supports.
    #[error("model not supported: {model}")]
    ModelNotSupported {
        /// Model name.
        model: String,
    },

    /// The rendered prompt exceeds the provider's context window.
    #[error("context length exceeded: {current} tokens, max is {max}")]
    ContextLengthExceeded {
        /// Current token count.
        current: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Failure decoding an SSE stream.
    #[error("streaming error: {0}")]
    StreamingError(String),

    /// Failure serializing a request body.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The call was cancelled or its deadline expired.
    #[error(transparent)]
    Aborted(#[from] wren_core::Aborted),

    /// Provider misconfiguration (bad base URL, missing required field).
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether the retry transport should retry after this error.
    ///
    /// Mirrors the classification table in the streaming transport's
    /// contract: rate limits, service errors, and network failures are
    /// retryable; auth failures, bad requests, and cancellation are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::ServiceError { .. } | Self::NetworkError(_) => true,
            Self::AuthFailed(_)
            | Self::InvalidRequest(_)
            | Self::Aborted(_)
            | Self::ApiKeyNotConfigured { .. }
            | Self::ModelNotSupported { .. }
            | Self::ContextLengthExceeded { .. }
            | Self::InvalidResponse(_)
            | Self::StreamingError(_)
            | Self::SerializationError(_)
            | Self::ConfigError(_)
            | Self::ApiRequestFailed(_) => false,
        }
    }

    /// Build the error for an HTTP status code plus response body, per the
    /// transport's status-to-error mapping.
    #[must_use]
    pub fn from_status(status: u16, body: String, retryable_5xx_and_above: bool) -> Self {
        match status {
            429 | 408 => Self::RateLimited {
                retry_after_secs: None,
            },
            401 | 403 => Self::AuthFailed(body),
            400 => Self::InvalidRequest(body),
            s if s >= 500 && retryable_5xx_and_above => Self::ServiceError { status: s, body },
            s => Self::ServiceError { status: s, body },
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::NetworkError(err.to_string())
        } else {
            Self::ApiRequestFailed(err.to_string())
        }
    }
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;
