//! LLM Port: provider-agnostic message types, the streaming transport
//! decorator chain, SSE parsing, and concrete OpenAI-compatible providers.

pub mod error;
pub mod openai_compat;
pub mod prelude;
pub mod provider;
pub mod retry;
pub mod sse;
pub mod transport;
pub mod types;

pub use error::{LlmError, LlmResult};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{LlmProvider, ProviderConfig, StreamBox};
pub use retry::RetryConfig;
pub use sse::{SseEvent, SseParser};
pub use types::{
    ContentPart, FunctionCall, ImagePart, LlmResponse, LlmToolDefinition, Message, MessageContent,
    MessageRole, Model, ModelLimits, StopReason, ToolCall, ToolExecutionResult, ToolResultKind,
    ToolResultStatus, Usage,
};
