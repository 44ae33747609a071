//! The innermost transport layer: a raw HTTP POST.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;
use wren_core::{Aborted, CancelToken};

use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use crate::error::{LlmError, LlmResult};

/// Performs the HTTP request and logs request/response envelope metadata.
pub struct FetchTransport {
    client: Client,
}

impl FetchTransport {
    /// Build a transport around a fresh `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Build a transport around a caller-supplied client (e.g. one with a
    /// custom timeout or proxy configuration).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for FetchTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for FetchTransport {
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> LlmResult<HttpResponse> {
        let mut builder = match request.method {
            HttpMethod::Post => self
                .client
                .post(&request.url)
                .header("Content-Type", "application/json")
                .json(&request.body),
            HttpMethod::Get => self.client.get(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let start = Instant::now();
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(LlmError::Aborted(Aborted)),
            result = builder.send() => result?,
        };
        let ttfb_ms = start.elapsed().as_millis();

        debug!(
            url = %request.url,
            status = response.status().as_u16(),
            ttfb_ms,
            "LLM transport request completed"
        );

        Ok(HttpResponse::new(response))
    }
}
