//! The streaming transport core: a decorator chain of
//! `RetryTransport(LLMErrorTransport(AuthTransport(FetchTransport)))`, each
//! layer depending only on the next inner layer.

mod auth;
mod error_transport;
mod fetch;
mod retry_transport;

pub use auth::{AuthMode, AuthTransport, OAuthCredential, TokenRefresher};
pub use error_transport::LLMErrorTransport;
pub use fetch::FetchTransport;
pub use retry_transport::RetryTransport;

use crate::error::LlmResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::pin::Pin;
use wren_core::CancelToken;

/// The HTTP verb a [`HttpRequest`] is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET`, no body.
    Get,
    /// `POST`, with a JSON body.
    Post,
}

/// A provider-agnostic HTTP request, as built by a concrete provider.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Full request URL.
    pub url: String,
    /// Extra headers beyond `Content-Type` (auth headers are injected by
    /// [`AuthTransport`], not set here).
    pub headers: Vec<(String, String)>,
    /// JSON request body. Ignored for [`HttpMethod::Get`].
    pub body: Value,
}

impl HttpRequest {
    /// Build a POST request with a JSON body and no extra headers.
    #[must_use]
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Build a GET request with no body.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: Value::Null,
        }
    }

    /// Attach a header, replacing the chain's defaults for downstream
    /// layers only if they check for it.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A byte stream from a successful streaming response.
pub type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// A provider-agnostic HTTP response. Body access is deferred so an outer
/// layer (retry, error classification) can inspect `status`/`headers`
/// without consuming it.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, used for `Retry-After` and content negotiation.
    pub headers: HeaderMap,
    response: reqwest::Response,
}

impl HttpResponse {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
            response,
        }
    }

    /// Consume the response, decoding it as JSON.
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> LlmResult<T> {
        self.response
            .json()
            .await
            .map_err(|e| crate::error::LlmError::InvalidResponse(e.to_string()))
    }

    /// Consume the response as plain text (used to build error messages).
    pub async fn text(self) -> String {
        self.response.text().await.unwrap_or_default()
    }

    /// Consume the response as an incremental byte stream, for SSE parsing.
    pub fn bytes_stream(self) -> ByteStream {
        use futures::StreamExt;
        Box::pin(self.response.bytes_stream())
    }
}

/// One layer of the transport decorator chain.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a single request, honoring `cancel`.
    async fn execute(&self, request: HttpRequest, cancel: &CancelToken) -> LlmResult<HttpResponse>;
}
