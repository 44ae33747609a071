//! An OpenAI-compatible LLM provider built on the transport decorator chain.
//!
//! Works with any endpoint speaking the OpenAI chat-completions wire
//! format: LM Studio, vLLM, Ollama's compatibility layer, and the OpenAI
//! API itself.

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tracing::debug;
use wren_core::CancelToken;

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ProviderConfig, StreamBox};
use crate::sse::{SseEvent, SseParser};
use crate::transport::{AuthMode, AuthTransport, FetchTransport, HttpRequest, HttpTransport, LLMErrorTransport, RetryTransport};
use crate::types::{
    FunctionCall, LlmResponse, LlmToolDefinition, Message, MessageContent, MessageRole, Model,
    StopReason, ToolCall, Usage,
};

const DEFAULT_LM_STUDIO_URL: &str = "http://localhost:1234/v1/chat/completions";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

type Chain = RetryTransport<LLMErrorTransport<AuthTransport<FetchTransport>>>;

/// An OpenAI-compatible provider, wired through
/// `RetryTransport(LLMErrorTransport(AuthTransport(FetchTransport)))`.
pub struct OpenAiCompatProvider {
    chain: Chain,
    model: String,
    max_tokens: usize,
    temperature: f64,
    base_url: String,
    max_context: usize,
}

impl OpenAiCompatProvider {
    /// A provider targeting a local LM Studio instance (no API key).
    #[must_use]
    pub fn lm_studio_with_model(model: &str) -> Self {
        Self::build(DEFAULT_LM_STUDIO_URL, AuthMode::None, model, 32_768)
    }

    /// A provider targeting the OpenAI API.
    #[must_use]
    pub fn openai(api_key: &str, model: &str) -> Self {
        let max_context = match model {
            m if m.contains("128k") => 128_000,
            m if m.contains("32k") => 32_768,
            m if m.contains("16k") => 16_385,
            _ => 8_192,
        };
        Self::build(
            DEFAULT_OPENAI_URL,
            AuthMode::ApiKey(api_key.to_string()),
            model,
            max_context,
        )
    }

    /// A provider targeting an arbitrary OpenAI-compatible endpoint.
    #[must_use]
    pub fn custom(base_url: &str, api_key: Option<&str>, model: &str) -> Self {
        let mode = match api_key {
            Some(key) => AuthMode::ApiKey(key.to_string()),
            None => AuthMode::None,
        };
        Self::build(base_url, mode, model, 32_768)
    }

    /// Build directly from a [`ProviderConfig`].
    #[must_use]
    pub fn from_config(config: ProviderConfig) -> Self {
        let mode = match config.api_key {
            Some(key) => AuthMode::ApiKey(key),
            None => AuthMode::None,
        };
        let base_url = config.base_url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
        let max_context = config.context_window.unwrap_or(32_768);
        let mut provider = Self::build(&base_url, mode, &config.model, max_context);
        provider.max_tokens = config.max_tokens;
        provider.temperature = config.temperature;
        provider
    }

    fn build(base_url: &str, mode: AuthMode, model: &str, max_context: usize) -> Self {
        let chain = RetryTransport::new(LLMErrorTransport::new(AuthTransport::new(
            FetchTransport::new(),
            mode,
        )));
        Self {
            chain,
            model: model.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            base_url: base_url.to_string(),
            max_context,
        }
    }

    /// Override the per-call max-tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn build_request(&self, messages: &[Message], tools: &[LlmToolDefinition], system: &str, stream: bool) -> Value {
        let mut openai_messages = Vec::new();
        if !system.is_empty() {
            openai_messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        for message in messages {
            openai_messages.push(convert_message(message));
        }

        let mut request = serde_json::json!({
            "model": self.model,
            "messages": openai_messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "stream": stream,
        });

        if !tools.is_empty() {
            let openai_tools: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    let mut parameters = tool.input_schema.clone();
                    if let Some(obj) = parameters.as_object_mut() {
                        obj.entry("properties").or_insert_with(|| serde_json::json!({}));
                    }
                    serde_json::json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": parameters,
                        }
                    })
                })
                .collect();
            request["tools"] = Value::Array(openai_tools);
        }

        request
    }

    /// Derive the model-listing endpoint from the chat-completions URL,
    /// e.g. `.../v1/chat/completions` → `.../v1/models`.
    fn models_url(&self) -> String {
        match self.base_url.strip_suffix("/chat/completions") {
            Some(prefix) => format!("{prefix}/models"),
            None => self.base_url.clone(),
        }
    }
}

fn convert_message(message: &Message) -> Value {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
        MessageRole::Tool => "tool",
    };

    if message.role == MessageRole::Tool {
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content.as_text(),
        });
    }

    if let Some(tool_calls) = &message.tool_calls {
        let openai_tool_calls: Vec<Value> = tool_calls
            .iter()
            .map(|call| {
                serde_json::json!({
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.function.name,
                        "arguments": call.function.arguments,
                    }
                })
            })
            .collect();
        return serde_json::json!({
            "role": "assistant",
            "content": Value::Null,
            "tool_calls": openai_tool_calls,
        });
    }

    match &message.content {
        MessageContent::Text(text) => serde_json::json!({"role": role, "content": text}),
        MessageContent::Parts(parts) => {
            let content: Vec<Value> = parts
                .iter()
                .map(|part| match part {
                    crate::types::ContentPart::Text { text } => {
                        serde_json::json!({"type": "text", "text": text})
                    }
                    crate::types::ContentPart::Image { image } => {
                        serde_json::json!({
                            "type": "image_url",
                            "image_url": {"url": format!("data:{};base64,{}", image.mime, image.base64)},
                        })
                    }
                })
                .collect();
            serde_json::json!({"role": role, "content": content})
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn max_context_length(&self) -> usize {
        self.max_context
    }

    async fn stream(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<StreamBox> {
        let body = self.build_request(messages, tools, system, true);
        debug!(model = %self.model, base_url = %self.base_url, "starting OpenAI-compatible stream");

        let request = HttpRequest::post_json(&self.base_url, body);
        let response = self.chain.execute(request, cancel).await?;
        let mut byte_stream = response.bytes_stream();
        let cancel = cancel.clone();

        let stream = try_stream! {
            let mut parser = SseParser::new();
            loop {
                let chunk = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(LlmError::Aborted(wren_core::Aborted))?,
                    next = byte_stream.next() => next,
                };
                let Some(chunk) = chunk else { break };
                let bytes = chunk.map_err(|e| LlmError::StreamingError(e.to_string()))?;
                for event in parser.push(&bytes) {
                    yield event;
                }
            }
            for event in parser.finish() {
                yield event;
            }
        };

        Ok(Box::pin(stream) as StreamBox)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[LlmToolDefinition],
        system: &str,
        cancel: &CancelToken,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request(messages, tools, system, false);
        debug!(model = %self.model, base_url = %self.base_url, "making OpenAI-compatible completion request");

        let request = HttpRequest::post_json(&self.base_url, body);
        let response = self.chain.execute(request, cancel).await?;
        let raw: RawCompletion = response.json().await?;

        let choice = raw
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

        let (content, has_tool_calls, tool_calls) = match choice.message.tool_calls {
            Some(calls) if !calls.is_empty() => {
                let converted = calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        function: FunctionCall {
                            name: call.function.name,
                            arguments: call.function.arguments,
                        },
                    })
                    .collect::<Vec<_>>();
                (String::new(), true, Some(converted))
            }
            _ => (choice.message.content.unwrap_or_default(), false, None),
        };

        let mut message = Message::assistant_text(content);
        message.tool_calls = tool_calls;

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            Some("tool_calls") => StopReason::ToolUse,
            Some("content_filter") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(LlmResponse {
            message,
            has_tool_calls,
            stop_reason,
            usage: Usage::new(raw.usage.prompt_tokens, raw.usage.completion_tokens),
        })
    }

    async fn get_models(&self, cancel: &CancelToken) -> LlmResult<Vec<Model>> {
        let request = HttpRequest::get(self.models_url());
        let response = self.chain.execute(request, cancel).await?;
        let raw: RawModelsResponse = response.json().await?;
        Ok(raw
            .data
            .into_iter()
            .map(|m| Model { name: m.id.clone(), id: m.id, limits: None })
            .collect())
    }
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_context", &self.max_context)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, serde::Deserialize)]
struct RawCompletion {
    choices: Vec<RawChoice>,
    usage: RawUsage,
}

#[derive(Debug, serde::Deserialize)]
struct RawChoice {
    message: RawMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RawMessage {
    content: Option<String>,
    tool_calls: Option<Vec<RawToolCall>>,
}

#[derive(Debug, serde::Deserialize)]
struct RawToolCall {
    id: String,
    function: RawFunctionCall,
}

#[derive(Debug, serde::Deserialize)]
struct RawFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, serde::Deserialize)]
struct RawUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, serde::Deserialize)]
struct RawModelsResponse {
    data: Vec<RawModel>,
}

#[derive(Debug, serde::Deserialize)]
struct RawModel {
    id: String,
}
