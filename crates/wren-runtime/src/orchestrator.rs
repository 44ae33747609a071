//! The turn loop: drives one conversation's `send()` calls, threading the
//! streamed LLM response, tool dispatch, memory, events, and metrics
//! together, and doubles as the delegation service `wren-tools`' delegation
//! tools call through.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use wren_approval::ApprovalManager;
use wren_core::{AgentId, CancelToken, ConversationId, MessageId, SessionId, ToolCallId};
use wren_events::{AgentEvent, EventBus, EventMetadata, ToolCallSummary};
use wren_llm::{LlmProvider, Message, MessageRole, SseEvent};
use wren_memory::MemoryPort;
use wren_metrics::{LlmCallUsage, MetricsAccumulator, MetricsSnapshot};
use wren_registry::{AgentRegistry, AgentTemplate, DelegatingDefaults, RegistryError, SpecialistAgentConfig};
use wren_tools::{
    DelegationOutcome, SubAgentRequest, SubAgentResult, SubAgentSpawner, ToolContext, ToolPort,
};

use crate::config::RuntimeConfig;
use crate::context::ContextBuilder;
use crate::error::{RuntimeError, RuntimeResult};
use crate::pool::DelegationPool;
use crate::payload::UserMessagePayload;

const TASK_PREVIEW_CHARS: usize = 200;

/// Per-call options for [`Orchestrator::send`].
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Optional wall-clock budget for the whole call. Exceeding it aborts
    /// the call the same way explicit cancellation would.
    pub deadline: Option<Duration>,
}

/// What a successful `send()` call resolves to.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// Wall-clock time the call took, in milliseconds.
    pub response_time_ms: u64,
    /// Usage accumulated across every LLM call this turn made.
    pub usage: wren_llm::Usage,
}

/// One conversation's orchestrator: owns a memory key, a fixed delegation
/// depth, and the collaborators (provider, tools, memory, events, metrics,
/// approval, registry) wired in at construction.
///
/// Sub-agents are themselves `Orchestrator`s, constructed fresh per
/// delegation and holding no reference back to their parent — only a
/// `sub_agent_tag` of plain ids, so the conversation tree never forms a
/// cycle.
pub struct Orchestrator<P: LlmProvider + 'static> {
    conversation_id: ConversationId,
    memory_key: String,
    config: RuntimeConfig,
    llm: Arc<P>,
    tools: Arc<dyn ToolPort>,
    memory: Arc<dyn MemoryPort<Message>>,
    metrics: MetricsAccumulator,
    event_bus: Arc<EventBus>,
    approval: Arc<ApprovalManager>,
    registry: Arc<AgentRegistry>,
    context: ContextBuilder,
    delegation_depth: u32,
    cancel: CancelToken,
    pool: Arc<DelegationPool>,
    sub_agent_tag: Option<(AgentId, ToolCallId)>,
    self_handle: RwLock<Option<Weak<Self>>>,
}

#[allow(clippy::too_many_arguments)]
impl<P: LlmProvider + 'static> Orchestrator<P> {
    /// Build a top-level orchestrator (delegation depth zero, no sub-agent tag).
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        memory_key: impl Into<String>,
        config: RuntimeConfig,
        llm: Arc<P>,
        tools: Arc<dyn ToolPort>,
        memory: Arc<dyn MemoryPort<Message>>,
        event_bus: Arc<EventBus>,
        approval: Arc<ApprovalManager>,
        registry: Arc<AgentRegistry>,
        pool: Arc<DelegationPool>,
    ) -> Arc<Self> {
        Self::new_child(
            conversation_id,
            memory_key,
            config,
            llm,
            tools,
            memory,
            MetricsAccumulator::new(),
            event_bus,
            approval,
            registry,
            pool,
            CancelToken::new(),
            0,
            None,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new_child(
        conversation_id: ConversationId,
        memory_key: impl Into<String>,
        config: RuntimeConfig,
        llm: Arc<P>,
        tools: Arc<dyn ToolPort>,
        memory: Arc<dyn MemoryPort<Message>>,
        metrics: MetricsAccumulator,
        event_bus: Arc<EventBus>,
        approval: Arc<ApprovalManager>,
        registry: Arc<AgentRegistry>,
        pool: Arc<DelegationPool>,
        cancel: CancelToken,
        delegation_depth: u32,
        sub_agent_tag: Option<(AgentId, ToolCallId)>,
    ) -> Arc<Self> {
        let context = ContextBuilder::new(config.max_context_tokens)
            .with_threshold(config.summarization_threshold)
            .keep_recent(config.keep_recent_count);

        Arc::new_cyclic(|weak| Self {
            conversation_id,
            memory_key: memory_key.into(),
            config,
            llm,
            tools,
            memory,
            metrics,
            event_bus,
            approval,
            registry,
            context,
            delegation_depth,
            cancel,
            pool,
            sub_agent_tag,
            self_handle: RwLock::new(Some(weak.clone())),
        })
    }

    /// Mint a fresh conversation id for a new top-level session.
    #[must_use]
    pub fn create_new_conversation(_session_id: Option<SessionId>) -> ConversationId {
        ConversationId::new()
    }

    /// The conversation this orchestrator is bound to.
    #[must_use]
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// A point-in-time copy of this orchestrator's accumulated metrics.
    #[must_use]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Process one user turn: append it to memory, run the tool-call loop
    /// up to `max_iterations`, and return once a tool-call-free assistant
    /// message is produced (or the budget is exhausted).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Aborted`] if cancelled or `opts.deadline`
    /// elapses, or a transport [`RuntimeError::Llm`] that retries couldn't
    /// recover. Every other internal failure is absorbed: logged, surfaced
    /// as an `error` event, and the loop continues.
    pub async fn send(&self, payload: UserMessagePayload, opts: SendOptions) -> RuntimeResult<SendOutcome> {
        match opts.deadline {
            Some(deadline) => {
                let run = self.run_send(payload);
                futures::pin_mut!(run);
                let sleep = tokio::time::sleep(deadline);
                futures::pin_mut!(sleep);

                tokio::select! {
                    biased;
                    result = &mut run => result,
                    () = &mut sleep => {
                        // Cancel cooperatively and let `run` unwind through
                        // its own cancellation path instead of dropping it,
                        // so a partial assistant message still gets saved.
                        self.cancel.cancel();
                        run.await
                    }
                }
            }
            None => self.run_send(payload).await,
        }
    }

    async fn run_send(&self, payload: UserMessagePayload) -> RuntimeResult<SendOutcome> {
        let start = Instant::now();
        let message_id = MessageId::new();

        let tool_defs = self.tools.tool_definitions(&self.config.enabled_tools).await;
        let tool_names: Vec<String> = tool_defs.iter().map(|def| def.name.clone()).collect();

        let user_message = payload.into_message();
        self.event_bus.publish(AgentEvent::MessageStarted {
            meta: self.event_meta(&message_id),
            tool_names,
            user_content: user_message.content.as_text(),
        });

        let mut history = self.memory.get(&self.memory_key).await.unwrap_or_default();
        history.push(user_message.clone());
        self.append_memory(&user_message, "user").await;

        let mut total_usage = wren_llm::Usage::default();

        for _iteration in 0..self.config.max_iterations {
            if self.cancel.is_cancelled() {
                return self.finish_aborted(&message_id);
            }

            if self.config.auto_summarize && self.context.needs_summarization(&*self.llm, &history, &self.config.system_prompt) {
                match self.context.summarize(&mut history, &*self.llm, &self.cancel).await {
                    Ok(crate::context::SummarizationResult::Summarized { summarized_count }) => {
                        debug!(summarized_count, "collapsed older history into a summary");
                        if let Err(error) = self.memory.set(&self.memory_key, history.clone()).await {
                            warn!(%error, "failed to persist summarized history");
                        }
                    }
                    Ok(crate::context::SummarizationResult::Skipped) => {}
                    Err(error) => warn!(%error, "summarization failed; continuing with full history"),
                }
            }

            self.event_bus.publish(AgentEvent::LlmCallStarted {
                meta: self.event_meta(&message_id),
                model: self.llm.model().to_string(),
            });

            let stream = self.llm.stream(&history, &tool_defs, &self.config.system_prompt, &self.cancel).await?;
            futures::pin_mut!(stream);

            let mut content = String::new();
            let mut pending_calls: BTreeMap<usize, PendingToolCall> = BTreeMap::new();
            let mut finish_reason = String::from("end_turn");
            let mut call_usage = wren_llm::Usage::default();

            loop {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {
                        return self.finish_aborted_with_partial(&message_id, &mut history, content);
                    }
                    next = stream.next() => {
                        match next {
                            Some(Ok(SseEvent::ContentDelta(delta))) => {
                                content.push_str(&delta);
                                self.event_bus.publish(AgentEvent::LlmChunk {
                                    meta: self.event_meta(&message_id),
                                    delta,
                                    reasoning: false,
                                });
                            }
                            Some(Ok(SseEvent::ReasoningDelta(delta))) => {
                                if self.config.thinking != wren_config::ThinkingLevel::Off {
                                    self.event_bus.publish(AgentEvent::LlmChunk {
                                        meta: self.event_meta(&message_id),
                                        delta,
                                        reasoning: true,
                                    });
                                }
                            }
                            Some(Ok(SseEvent::ToolCallDelta { index, id, name, arguments_so_far })) => {
                                let entry = pending_calls.entry(index).or_default();
                                if entry.id.is_none() {
                                    entry.id = id;
                                }
                                if entry.name.is_none() {
                                    entry.name = name;
                                }
                                entry.arguments = arguments_so_far;
                            }
                            Some(Ok(SseEvent::StreamFinish { finish_reason: reason, usage })) => {
                                if let Some(reason) = reason {
                                    finish_reason = reason;
                                }
                                if let Some(usage) = usage {
                                    call_usage = usage;
                                }
                                break;
                            }
                            Some(Err(error)) => return Err(error.into()),
                            None => break,
                        }
                    }
                }
            }

            self.metrics.record_llm_call(LlmCallUsage {
                prompt_tokens: call_usage.prompt_tokens,
                completion_tokens: call_usage.completion_tokens,
                cached_tokens: call_usage.cached_tokens.unwrap_or(0),
                reasoning_tokens: call_usage.reasoning_tokens.unwrap_or(0),
                cost: call_usage.cost.unwrap_or(0.0),
            });
            accumulate_usage(&mut total_usage, &call_usage);

            self.event_bus.publish(AgentEvent::LlmCallCompleted {
                meta: self.event_meta(&message_id),
                finish_reason,
                usage: to_event_usage(&call_usage),
            });

            let estimated_tokens = self.context.stats(&*self.llm, &history, &self.config.system_prompt).current_tokens as u64;
            self.metrics.set_context_window(self.llm.max_context_length() as u64, estimated_tokens);

            let tool_calls: Vec<wren_llm::ToolCall> = pending_calls
                .into_iter()
                .filter_map(|(_, call)| call.into_tool_call())
                .collect();

            let assistant_message = if tool_calls.is_empty() {
                Message::assistant_text(content)
            } else {
                let text = if content.is_empty() { None } else { Some(content) };
                Message::assistant_tool_calls(text, tool_calls.clone())
            };

            let had_tool_calls = !tool_calls.is_empty();
            let assistant_content = assistant_message.content.as_text();
            history.push(assistant_message.clone());
            self.append_memory(&assistant_message, "assistant").await;
            self.event_bus.publish(AgentEvent::AssistantMessage {
                meta: self.event_meta(&message_id),
                content: if assistant_content.is_empty() { None } else { Some(assistant_content) },
                had_tool_calls,
            });

            if tool_calls.is_empty() {
                let response_time_ms = start.elapsed().as_millis() as u64;
                self.metrics.record_request_complete(response_time_ms);
                self.event_bus.publish(AgentEvent::Done {
                    meta: self.event_meta(&message_id),
                    response_time_ms,
                    usage: to_event_usage(&total_usage),
                });
                return Ok(SendOutcome { response_time_ms, usage: total_usage });
            }

            self.event_bus.publish(AgentEvent::ToolCalls {
                meta: self.event_meta(&message_id),
                tool_calls: tool_calls
                    .iter()
                    .map(|call| ToolCallSummary {
                        id: wren_core::ToolCallId::from_string(call.id.clone()),
                        name: call.function.name.clone(),
                        arguments: call.function.arguments.clone(),
                    })
                    .collect(),
            });

            let mut tool_ctx = ToolContext::new(
                self.event_bus.clone(),
                self.conversation_id.clone(),
                message_id.clone(),
                self.approval.clone(),
                self.cancel.clone(),
                self.config.workspace_root.clone(),
            );
            tool_ctx.delegation_depth = self.delegation_depth;
            if let Some(handle) = self.self_arc().await {
                let spawner: Arc<dyn SubAgentSpawner> = handle;
                tool_ctx.set_subagent_spawner(Some(spawner)).await;
            }

            let results = self.tools.execute_tool_calls(&tool_calls, &tool_ctx, self.config.max_concurrent_tools).await;
            for result in results {
                let tool_message = Message::tool_result(result.id.clone(), result.name.clone(), result.result.clone());
                history.push(tool_message.clone());
                self.append_memory(&tool_message, "tool").await;
                self.metrics.record_tool_call();
            }
        }

        let response_time_ms = start.elapsed().as_millis() as u64;
        self.metrics.record_request_complete(response_time_ms);
        self.event_bus.publish(AgentEvent::Error {
            meta: self.event_meta(&message_id),
            kind: "iteration_limit".to_string(),
            message: format!("reached max_iterations ({})", self.config.max_iterations),
        });
        Ok(SendOutcome { response_time_ms, usage: total_usage })
    }

    async fn append_memory(&self, message: &Message, role: &str) {
        if let Err(error) = self.memory.append(&self.memory_key, message.clone()).await {
            warn!(%error, role, "failed to persist message to memory");
        }
        self.event_bus.publish(AgentEvent::MemoryAppended {
            meta: EventMetadata::new(self.conversation_id.clone(), message.id.clone()),
            role: role.to_string(),
        });
    }

    fn event_meta(&self, message_id: &MessageId) -> EventMetadata {
        match &self.sub_agent_tag {
            Some((agent_id, tool_call_id)) => {
                EventMetadata::for_sub_agent(self.conversation_id.clone(), message_id.clone(), agent_id.clone(), tool_call_id.clone())
            }
            None => EventMetadata::new(self.conversation_id.clone(), message_id.clone()),
        }
    }

    fn finish_aborted(&self, message_id: &MessageId) -> RuntimeResult<SendOutcome> {
        self.event_bus.publish(AgentEvent::Error {
            meta: self.event_meta(message_id),
            kind: "aborted".to_string(),
            message: "operation aborted (cancelled or deadline exceeded)".to_string(),
        });
        Err(RuntimeError::Aborted(wren_core::Aborted))
    }

    fn finish_aborted_with_partial(
        &self,
        message_id: &MessageId,
        history: &mut Vec<Message>,
        content: String,
    ) -> RuntimeResult<SendOutcome> {
        if !content.is_empty() {
            let partial = Message::assistant_text(content);
            history.push(partial.clone());
            let memory = self.memory.clone();
            let memory_key = self.memory_key.clone();
            let event_bus = self.event_bus.clone();
            let conversation_id = self.conversation_id.clone();
            tokio::spawn(async move {
                if let Err(error) = memory.append(&memory_key, partial.clone()).await {
                    warn!(%error, "failed to persist partial assistant message on abort");
                }
                event_bus.publish(AgentEvent::MemoryAppended {
                    meta: EventMetadata::new(conversation_id, partial.id.clone()),
                    role: "assistant".to_string(),
                });
            });
        }
        self.finish_aborted(message_id)
    }

    async fn self_arc(&self) -> Option<Arc<Self>> {
        self.self_handle.read().await.as_ref().and_then(Weak::upgrade)
    }
}

#[derive(Default)]
struct PendingToolCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl PendingToolCall {
    fn into_tool_call(self) -> Option<wren_llm::ToolCall> {
        let id = self.id?;
        let name = self.name?;
        Some(wren_llm::ToolCall {
            id,
            function: wren_llm::FunctionCall { name, arguments: self.arguments },
        })
    }
}

fn to_event_usage(usage: &wren_llm::Usage) -> wren_events::Usage {
    wren_events::Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        reasoning_tokens: usage.reasoning_tokens,
        cost: usage.cost,
    }
}

fn accumulate_usage(total: &mut wren_llm::Usage, call: &wren_llm::Usage) {
    total.prompt_tokens += call.prompt_tokens;
    total.completion_tokens += call.completion_tokens;
    total.total_tokens += call.total_tokens;
    total.reasoning_tokens = match (total.reasoning_tokens, call.reasoning_tokens) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    };
    total.cached_tokens = match (total.cached_tokens, call.cached_tokens) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    };
    total.cost = match (total.cost, call.cost) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    };
}

fn truncate_for_prompt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

fn default_agent_template() -> AgentTemplate {
    AgentTemplate {
        id: None,
        name: None,
        description: None,
        system_prompt: "You are a capable generalist assistant invoked to handle a delegated \
                         task. Stay focused on the assigned task and report back concisely."
            .to_string(),
        tools: Vec::new(),
        provider: None,
        model: None,
        temperature: None,
        max_tokens: None,
        top_p: None,
        timeout_ms: None,
        share_context: None,
        metadata: std::collections::HashMap::new(),
    }
}

async fn extract_last_assistant_text(memory: &Arc<dyn MemoryPort<Message>>, key: &str) -> String {
    let history = memory.get(key).await.unwrap_or_default();
    history
        .into_iter()
        .rev()
        .find(|message| message.role == MessageRole::Assistant)
        .map(|message| message.content.as_text())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "(sub-agent produced no text output)".to_string())
}

#[async_trait]
impl<P: LlmProvider + 'static> SubAgentSpawner for Orchestrator<P> {
    async fn spawn(&self, request: SubAgentRequest, ctx: &ToolContext) -> Result<DelegationOutcome, String> {
        if request.delegation_depth > self.config.max_delegation_depth {
            return Err("delegation depth exceeded".to_string());
        }

        let template = match self.registry.get(&request.agent).await {
            Ok(template) => template,
            Err(RegistryError::NotFound(_)) => Arc::new(default_agent_template()),
            Err(error) => return Err(format!("failed to load agent template '{}': {error}", request.agent)),
        };

        if !template.tools.is_empty() {
            if let Some(denied) = template.tools.iter().find(|name| !self.config.enabled_tools.contains(name)) {
                return Err(format!(
                    "agent template '{}' requests tool '{denied}' outside the delegating conversation's reachable tools",
                    request.agent
                ));
            }
        }

        let tool_call_id = ToolCallId::new();

        let defaults = DelegatingDefaults {
            tools: self.config.enabled_tools.clone(),
            timeout_ms: Some(self.config.default_delegation_timeout.as_millis() as u64),
            ..Default::default()
        };

        let specialist = SpecialistAgentConfig::materialize(
            &template,
            &defaults,
            request.task.clone(),
            request.delegation_depth,
            self.config.max_delegation_depth,
            self.conversation_id.clone(),
            ctx.message_id.clone(),
            tool_call_id.clone(),
        )
        .map_err(|error| error.to_string())?;

        let session_id = SessionId::new();
        let memory_key = format!("agent:{}:{}", specialist.agent_id.as_str(), session_id.as_str());

        let mut child_config = self.config.clone();
        child_config.system_prompt = format!(
            "{}\n\n# Delegation context\nYou are a specialist sub-agent invoked via delegation. \
             Assigned task (preview): {}",
            specialist.system_prompt,
            truncate_for_prompt(&request.task, TASK_PREVIEW_CHARS),
        );
        if !specialist.tools.is_empty() {
            child_config.enabled_tools = specialist.tools.clone();
        }

        let child = Self::new_child(
            self.conversation_id.clone(),
            memory_key.clone(),
            child_config,
            self.llm.clone(),
            self.tools.clone(),
            self.memory.clone(),
            MetricsAccumulator::new(),
            self.event_bus.clone(),
            self.approval.clone(),
            self.registry.clone(),
            self.pool.clone(),
            self.cancel.child(),
            specialist.delegation_depth,
            Some((specialist.agent_id.clone(), tool_call_id.clone())),
        );

        let sub_meta = EventMetadata::for_sub_agent(
            self.conversation_id.clone(),
            ctx.message_id.clone(),
            specialist.agent_id.clone(),
            tool_call_id.clone(),
        );
        self.event_bus.publish(AgentEvent::SubAgentStarted {
            meta: sub_meta,
            agent_template_id: request.agent.clone(),
            task: request.task.clone(),
        });

        let pool = self.pool.clone();
        let event_bus = self.event_bus.clone();
        let conversation_id = self.conversation_id.clone();
        let agent_id = specialist.agent_id.clone();
        let task = request.task.clone();
        let timeout = request.timeout;
        let memory = self.memory.clone();

        if request.background {
            let background_session_id = session_id.clone();
            tokio::spawn(async move {
                let Ok(_permit) = pool.semaphore().acquire_owned().await else { return };
                let result = run_child_to_completion(child, memory, memory_key, task, timeout).await;
                publish_completion(&event_bus, &conversation_id, &agent_id, &tool_call_id, &result);
                pool.record_background(background_session_id, result).await;
            });
            Ok(DelegationOutcome::Background(session_id))
        } else {
            let _permit = pool.semaphore().acquire_owned().await.map_err(|error| error.to_string())?;
            let result = run_child_to_completion(child, memory, memory_key, task, timeout).await;
            publish_completion(&event_bus, &conversation_id, &agent_id, &tool_call_id, &result);
            Ok(DelegationOutcome::Completed(result))
        }
    }

    async fn poll_background(&self, session_id: &SessionId, block: bool, timeout: Option<Duration>) -> Option<SubAgentResult> {
        self.pool.poll(session_id, block, timeout).await
    }
}

async fn run_child_to_completion<P: LlmProvider + 'static>(
    child: Arc<Orchestrator<P>>,
    memory: Arc<dyn MemoryPort<Message>>,
    memory_key: String,
    task: String,
    timeout: Duration,
) -> SubAgentResult {
    let started = Instant::now();
    let agent_id = child
        .sub_agent_tag
        .as_ref()
        .map(|(agent_id, _)| agent_id.as_str().to_string())
        .unwrap_or_default();

    let send_result = child
        .send(UserMessagePayload::Text(task), SendOptions { deadline: Some(timeout) })
        .await;

    let execution_time_ms = started.elapsed().as_millis() as u64;
    let snapshot = child.metrics_snapshot();

    let (success, error, summary) = match send_result {
        Ok(_) => (true, None, extract_last_assistant_text(&memory, &memory_key).await),
        Err(RuntimeError::Aborted(_)) => (false, Some("delegation timed out or was cancelled".to_string()), String::new()),
        Err(other) => (false, Some(other.to_string()), String::new()),
    };

    SubAgentResult {
        success,
        summary,
        error,
        agent_id,
        execution_time_ms,
        tool_calls_executed: snapshot.tool_call_count as usize,
        tokens_used: snapshot.total_tokens,
        metrics: snapshot,
    }
}

fn publish_completion(
    event_bus: &Arc<EventBus>,
    conversation_id: &ConversationId,
    agent_id: &AgentId,
    tool_call_id: &ToolCallId,
    result: &SubAgentResult,
) {
    let message_id = MessageId::new();
    event_bus.publish(AgentEvent::SubAgentMetrics {
        meta: EventMetadata::for_sub_agent(conversation_id.clone(), message_id.clone(), agent_id.clone(), tool_call_id.clone()),
        snapshot: result.metrics.clone(),
    });
    event_bus.publish(AgentEvent::SubAgentCompleted {
        meta: EventMetadata::for_sub_agent(conversation_id.clone(), message_id, agent_id.clone(), tool_call_id.clone()),
        success: result.success,
        execution_time_ms: result.execution_time_ms,
    });
}
