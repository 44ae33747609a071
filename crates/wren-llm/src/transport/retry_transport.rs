//! Wraps the inner chain with exponential-backoff retry honoring
//! `Retry-After`.

use async_trait::async_trait;
use rand::Rng;
use wren_core::CancelToken;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{LlmError, LlmResult};
use crate::retry::RetryConfig;

/// Retries the inner transport on retryable errors, honoring a
/// `Retry-After`-derived delay when [`LlmError::RateLimited`] carries one,
/// otherwise falling back to jittered exponential backoff.
pub struct RetryTransport<T> {
    inner: T,
    config: RetryConfig,
}

impl<T: HttpTransport> RetryTransport<T> {
    /// Wrap `inner` with the default [`RetryConfig`].
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            config: RetryConfig::default(),
        }
    }

    /// Wrap `inner` with an explicit retry configuration.
    #[must_use]
    pub fn with_config(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for RetryTransport<T> {
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> LlmResult<HttpResponse> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(LlmError::Aborted(wren_core::Aborted));
            }
            match self.inner.execute(request.clone(), cancel).await {
                Ok(response) => return Ok(response),
                Err(error) => {
                    if attempt >= self.config.max_retries || !error.is_retryable() {
                        return Err(error);
                    }
                    let delay = match &error {
                        LlmError::RateLimited {
                            retry_after_secs: Some(secs),
                        } => std::time::Duration::from_secs(*secs).min(self.config.max_delay),
                        _ => {
                            let jitter = rand::thread_rng().gen_range(-1.0..=1.0);
                            self.config.delay_for_attempt_with_jitter(attempt, jitter)
                        }
                    };
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(LlmError::Aborted(wren_core::Aborted)),
                        () = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyTransport {
        fail_times: AtomicU32,
    }

    #[async_trait]
    impl HttpTransport for FlakyTransport {
        async fn execute(&self, _request: HttpRequest, _cancel: &CancelToken) -> LlmResult<HttpResponse> {
            if self.fail_times.load(Ordering::SeqCst) > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(LlmError::ServiceError {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Err(LlmError::InvalidRequest("no real response in this fixture".into()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_retryable_errors_up_to_the_configured_max() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay: std::time::Duration::from_millis(1),
            max_delay: std::time::Duration::from_millis(10),
            multiplier: 1.0,
            jitter_factor: 0.0,
        };
        let transport = RetryTransport::with_config(
            FlakyTransport {
                fail_times: AtomicU32::new(5),
            },
            config,
        );
        let cancel = CancelToken::new();
        let request = HttpRequest::post_json("http://example.invalid", serde_json::json!({}));
        let result = transport.execute(request, &cancel).await;
        // exhausts after max_retries+1 attempts, all 503s consumed down to 2
        assert!(matches!(result, Err(LlmError::ServiceError { status: 503, .. })));
    }

    #[tokio::test]
    async fn non_retryable_errors_fail_immediately() {
        let transport = RetryTransport::new(FlakyTransport {
            fail_times: AtomicU32::new(0),
        });
        let cancel = CancelToken::new();
        let request = HttpRequest::post_json("http://example.invalid", serde_json::json!({}));
        let result = transport.execute(request, &cancel).await;
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }
}
