//! The LLM Port trait and its stream item type.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::LlmResult;
use crate::sse::SseEvent;
use crate::types::{LlmResponse, LlmToolDefinition, Message, Model, ModelLimits};
use wren_core::CancelToken;

/// A boxed stream of decoded SSE events, as returned by
/// [`LlmProvider::stream`].
pub type StreamBox = Pin<Box<dyn Stream<Item = LlmResult<SseEvent>> + Send>>;

/// The LLM Port: send a completion (blocking or streamed) and describe the
/// model in use.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// The provider's name, e.g. `"openai-compat"`.
    fn name(&self) -> &str;

    /// The model identifier currently configured.
    fn model(&self) -> &str;

    /// Stream a completion, yielding incremental [`SseEvent`]s as the model
    /// generates output. `cancel` is checked at every suspension point.
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<StreamBox>;

    /// Complete without streaming, returning the full response at once.
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<LlmResponse>;

    /// Convenience wrapper: a single-turn, tool-free text completion.
    async fn complete_simple(&self, prompt: &str, cancel: &CancelToken) -> LlmResult<String> {
        let messages = vec![Message::user(prompt)];
        let response = self.complete(&messages, &[], "", cancel).await?;
        Ok(response.message.content.as_text())
    }

    /// Rough token estimate for text not yet sent to the provider.
    fn count_tokens(&self, text: &str) -> usize {
        text.len() / 4
    }

    /// The provider's declared context window, in tokens.
    fn max_context_length(&self) -> usize;

    /// List the models this provider can be pointed at.
    ///
    /// The default reports only the currently configured model with its
    /// known context window; providers backed by a real model-listing
    /// endpoint (e.g. OpenAI's `/v1/models`) should override this.
    async fn get_models(&self, _cancel: &CancelToken) -> LlmResult<Vec<Model>> {
        Ok(vec![Model {
            id: self.model().to_string(),
            name: self.model().to_string(),
            limits: Some(ModelLimits {
                context_window: Some(self.max_context_length()),
                max_output: None,
            }),
        }])
    }
}

#[async_trait]
impl LlmProvider for Box<dyn LlmProvider> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }

    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<StreamBox> {
        (**self).stream(messages, tools, system, cancel).await
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<LlmResponse> {
        (**self).complete(messages, tools, system, cancel).await
    }

    fn count_tokens(&self, text: &str) -> usize {
        (**self).count_tokens(text)
    }

    fn max_context_length(&self) -> usize {
        (**self).max_context_length()
    }

    async fn get_models(&self, cancel: &CancelToken) -> LlmResult<Vec<Model>> {
        (**self).get_models(cancel).await
    }
}

/// Construction-time configuration shared by concrete providers.
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key, if the endpoint requires one.
    pub api_key: Option<String>,
    /// Model name.
    pub model: String,
    /// Maximum tokens to generate per call.
    pub max_tokens: usize,
    /// Sampling temperature, clamped to `[0.0, 1.0]`.
    pub temperature: f64,
    /// Base URL, for self-hosted or alternate endpoints.
    pub base_url: Option<String>,
    /// Context window override, in tokens.
    pub context_window: Option<usize>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("has_api_key", &self.api_key.is_some())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("context_window", &self.context_window)
            .finish()
    }
}

impl ProviderConfig {
    /// Start a config for `model`, with no API key set.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.7,
            base_url: None,
            context_window: None,
        }
    }

    /// Attach an API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the max-tokens-per-call.
    #[must_use]
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens = max;
        self
    }

    /// Override the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp.clamp(0.0, 1.0);
        self
    }

    /// Point at a non-default base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the provider's declared context window.
    #[must_use]
    pub fn with_context_window(mut self, size: usize) -> Self {
        self.context_window = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = ProviderConfig::new("local-model").with_api_key("sk-super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("has_api_key: true"));
    }

    #[test]
    fn temperature_is_clamped() {
        let config = ProviderConfig::new("local-model").with_temperature(5.0);
        assert_eq!(config.temperature, 1.0);
    }
}
