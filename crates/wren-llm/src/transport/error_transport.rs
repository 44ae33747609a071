//! Maps HTTP status codes to typed [`LlmError`]s.

use async_trait::async_trait;
use wren_core::CancelToken;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{LlmError, LlmResult};
use crate::retry::parse_retry_after_secs;

/// Classifies non-2xx responses into a typed, retryable-or-not
/// [`LlmError`], per the streaming transport's status table:
/// - 429, 408 → retryable rate-limit.
/// - 401, 403 → non-retryable auth failure.
/// - 400 → non-retryable invalid request.
/// - 5xx → retryable service error.
pub struct LLMErrorTransport<T> {
    inner: T,
}

impl<T: HttpTransport> LLMErrorTransport<T> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for LLMErrorTransport<T> {
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> LlmResult<HttpResponse> {
        let response = self.inner.execute(request, cancel).await?;
        if (200..300).contains(&response.status) {
            return Ok(response);
        }

        let status = response.status;
        let retry_after_secs = response
            .headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after_secs);
        let body = response.text().await;

        Err(match status {
            429 | 408 => LlmError::RateLimited { retry_after_secs },
            401 | 403 => LlmError::AuthFailed(body),
            400 => LlmError::InvalidRequest(body),
            s if s >= 500 => LlmError::ServiceError { status: s, body },
            s => LlmError::ServiceError { status: s, body },
        })
    }
}
