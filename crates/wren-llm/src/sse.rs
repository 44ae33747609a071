//! Pure state-machine SSE parser for OpenAI-compatible streaming completions.
//!
//! Kept independent of any I/O: callers feed it raw bytes as they arrive
//! (which may split a `data: ...` frame across reads) and drain the
//! [`SseEvent`]s it produces. All state needed to resume across reads
//! (the line buffer, in-progress tool-call fragments, and whether the
//! terminal event has already fired) lives on [`SseParser`] itself.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::types::Usage;

/// One decoded event surfaced by [`SseParser::push`].
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// A non-empty content delta.
    ContentDelta(String),
    /// A non-empty reasoning ("thinking") delta, kept distinct from
    /// [`SseEvent::ContentDelta`] so callers can gate whether to surface it.
    ReasoningDelta(String),
    /// A tool-call fragment, merged by index; emitted once the call's name
    /// is known and again for each subsequent arguments fragment.
    ToolCallDelta {
        /// Position of this call among those requested in the turn.
        index: usize,
        /// Call id, once known.
        id: Option<String>,
        /// Tool name, once known.
        name: Option<String>,
        /// The incremental arguments fragment (already concatenated with
        /// prior fragments at this index).
        arguments_so_far: String,
    },
    /// The stream finished. Emitted exactly once per stream even if the
    /// terminal chunk carries both `finish_reason` and `usage` together.
    StreamFinish {
        /// The provider's reported stop reason, if present.
        finish_reason: Option<String>,
        /// Normalized usage, if the terminal chunk carried one.
        usage: Option<Usage>,
    },
}

#[derive(Default)]
struct ToolCallAccumulator {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Incremental SSE decoder. One instance per stream.
#[derive(Default)]
pub struct SseParser {
    line_buffer: String,
    tool_calls: BTreeMap<usize, ToolCallAccumulator>,
    stream_finish_emitted: bool,
}

impl SseParser {
    /// Start a fresh parser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of bytes, returning every event it completes.
    /// Bytes that don't complete a `\n\n`-terminated frame are retained in
    /// the internal line buffer for the next call.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.line_buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();

        while let Some(frame_end) = self.line_buffer.find("\n\n") {
            let frame = self.line_buffer[..frame_end].to_string();
            self.line_buffer.drain(..frame_end + 2);
            self.handle_frame(&frame, &mut events);
        }

        events
    }

    /// Signal end of input; flushes any tool-call fragment left dangling
    /// without an explicit terminal chunk (a defensive finish, not the
    /// normal path).
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if !self.stream_finish_emitted {
            self.emit_stream_finish(None, None, &mut events);
        }
        events
    }

    fn handle_frame(&mut self, frame: &str, events: &mut Vec<SseEvent>) {
        for line in frame.lines() {
            let Some(data) = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")) else {
                continue;
            };
            let data = data.trim();
            if data == "[DONE]" {
                if !self.stream_finish_emitted {
                    self.emit_stream_finish(None, None, events);
                }
                continue;
            }
            let Ok(chunk) = serde_json::from_str::<RawChunk>(data) else {
                continue;
            };
            self.handle_chunk(chunk, events);
        }
    }

    fn handle_chunk(&mut self, chunk: RawChunk, events: &mut Vec<SseEvent>) {
        let usage = chunk.usage.map(normalize_usage);
        let Some(choice) = chunk.choices.into_iter().next() else {
            if let Some(usage) = usage {
                if !self.stream_finish_emitted {
                    self.emit_stream_finish(None, Some(usage), events);
                }
            }
            return;
        };

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                events.push(SseEvent::ContentDelta(content));
            }
        }

        if let Some(reasoning) = choice.delta.reasoning_content {
            if !reasoning.is_empty() {
                events.push(SseEvent::ReasoningDelta(reasoning));
            }
        }

        if let Some(tool_call_deltas) = choice.delta.tool_calls {
            for fragment in tool_call_deltas {
                let entry = self.tool_calls.entry(fragment.index).or_default();
                if entry.id.is_none() {
                    entry.id = fragment.id.clone();
                }
                if let Some(function) = &fragment.function {
                    if entry.name.is_none() {
                        entry.name = function.name.clone();
                    }
                    if let Some(args) = &function.arguments {
                        entry.arguments.push_str(args);
                    }
                }
                events.push(SseEvent::ToolCallDelta {
                    index: fragment.index,
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    arguments_so_far: entry.arguments.clone(),
                });
            }
        }

        if choice.finish_reason.is_some() || usage.is_some() {
            if !self.stream_finish_emitted {
                self.emit_stream_finish(choice.finish_reason, usage, events);
            }
        }
    }

    fn emit_stream_finish(
        &mut self,
        finish_reason: Option<String>,
        usage: Option<Usage>,
        events: &mut Vec<SseEvent>,
    ) {
        self.stream_finish_emitted = true;
        events.push(SseEvent::StreamFinish {
            finish_reason,
            usage,
        });
    }

    /// Assemble the final tool calls accumulated over the stream, in index
    /// order, once a [`SseEvent::StreamFinish`] has been observed.
    #[must_use]
    pub fn assembled_tool_calls(&self) -> Vec<(usize, Option<String>, Option<String>, String)> {
        self.tool_calls
            .iter()
            .map(|(index, acc)| (*index, acc.id.clone(), acc.name.clone(), acc.arguments.clone()))
            .collect()
    }
}

fn normalize_usage(raw: RawUsage) -> Usage {
    let prompt = raw.prompt_tokens.or(raw.input_tokens).unwrap_or(0);
    let completion = raw.completion_tokens.or(raw.output_tokens).unwrap_or(0);
    let total = raw.total_tokens.unwrap_or(prompt + completion);
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
        reasoning_tokens: raw
            .completion_tokens_details
            .as_ref()
            .and_then(|d| d.reasoning_tokens),
        cached_tokens: raw
            .prompt_tokens_details
            .as_ref()
            .and_then(|d| d.cached_tokens),
        cost: raw.cost,
    }
}

#[derive(Debug, Deserialize)]
struct RawChunk {
    #[serde(default)]
    choices: Vec<RawChoice>,
    #[serde(default)]
    usage: Option<RawUsage>,
}

#[derive(Debug, Deserialize)]
struct RawChoice {
    #[serde(default)]
    delta: RawDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDelta {
    #[serde(default)]
    content: Option<String>,
    /// The OpenAI-compatible "thinking" extension (DeepSeek R1 and
    /// compatible endpoints); absent on providers with no reasoning model.
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<RawToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct RawToolCallDelta {
    index: usize,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<RawFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct RawFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUsage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
    #[serde(default)]
    total_tokens: Option<u64>,
    #[serde(default)]
    input_tokens: Option<u64>,
    #[serde(default)]
    output_tokens: Option<u64>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    prompt_tokens_details: Option<RawPromptTokensDetails>,
    #[serde(default)]
    completion_tokens_details: Option<RawCompletionTokensDetails>,
}

#[derive(Debug, Deserialize)]
struct RawPromptTokensDetails {
    #[serde(default)]
    cached_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCompletionTokensDetails {
    #[serde(default)]
    reasoning_tokens: Option<u64>,
}
