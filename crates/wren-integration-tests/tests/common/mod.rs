//! Shared scaffolding for wiring a full [`Orchestrator`] stack in tests:
//! a provider, in-memory memory port, a composite tool port over whatever
//! [`wren_tools::BuiltinTool`]s the test supplies, and an always-allow
//! approval hook.

use std::sync::Arc;

use wren_approval::{AlwaysAllow, ApprovalManager};
use wren_core::ConversationId;
use wren_events::EventBus;
use wren_llm::{LlmProvider, Message};
use wren_memory::{InMemoryStore, MemoryPort};
use wren_registry::{AgentRegistry, FileTemplateStore};
use wren_runtime::{Orchestrator, RuntimeConfig};
use wren_test::MockLlmProvider;
use wren_tools::{BuiltinTool, BuiltinToolPort, CompositeToolPort, ToolPort};

/// Everything one test needs a handle back to after building an
/// orchestrator: the memory key it writes to and the bus it publishes on.
pub struct Harness<P: LlmProvider + 'static> {
    pub orchestrator: Arc<Orchestrator<P>>,
    pub memory: Arc<dyn MemoryPort<Message>>,
    pub memory_key: String,
    pub event_bus: Arc<EventBus>,
}

/// Build an orchestrator over a [`MockLlmProvider`] and `tools`, with a
/// fresh in-memory memory port, a no-op-approving approval manager, and an
/// empty (template-less) agent registry backed by a throwaway directory.
pub fn build_harness(llm: MockLlmProvider, tools: Vec<Arc<dyn BuiltinTool>>) -> Harness<MockLlmProvider> {
    build_harness_with_config(llm, tools, RuntimeConfig::default())
}

/// Same as [`build_harness`] but lets the caller override the runtime
/// config (e.g. `max_delegation_depth`, `max_iterations`).
pub fn build_harness_with_config(
    llm: MockLlmProvider,
    tools: Vec<Arc<dyn BuiltinTool>>,
    config: RuntimeConfig,
) -> Harness<MockLlmProvider> {
    build_custom_harness_with_config(llm, tools, config)
}

/// Same as [`build_harness`] but over any [`LlmProvider`], for tests that
/// need finer control over streaming behavior than [`MockLlmProvider`]
/// offers.
pub fn build_custom_harness<P: LlmProvider + 'static>(llm: P, tools: Vec<Arc<dyn BuiltinTool>>) -> Harness<P> {
    build_custom_harness_with_config(llm, tools, RuntimeConfig::default())
}

/// Same as [`build_custom_harness`] with an overridden runtime config.
pub fn build_custom_harness_with_config<P: LlmProvider + 'static>(
    llm: P,
    tools: Vec<Arc<dyn BuiltinTool>>,
    mut config: RuntimeConfig,
) -> Harness<P> {
    let memory: Arc<dyn MemoryPort<Message>> = Arc::new(InMemoryStore::new());
    let event_bus = Arc::new(EventBus::new());
    let approval = Arc::new(ApprovalManager::new(Arc::new(AlwaysAllow)));

    let template_dir = tempfile::tempdir().expect("create temp dir for template store");
    let registry = Arc::new(AgentRegistry::new(Arc::new(FileTemplateStore::new(template_dir.path()))));
    // Keep the tempdir alive for the registry's lifetime by leaking it; test
    // processes are short-lived and this avoids threading an extra guard
    // through every call site.
    std::mem::forget(template_dir);

    config.enabled_tools = tools.iter().map(|tool| tool.name().to_string()).collect();
    let builtin_port: Arc<dyn ToolPort> = Arc::new(BuiltinToolPort::new(tools));
    let tool_port: Arc<dyn ToolPort> = Arc::new(CompositeToolPort::new(vec![builtin_port]));

    let conversation_id = ConversationId::new();
    let memory_key = format!("conv:{}", conversation_id.as_str());
    let pool = Arc::new(wren_runtime::DelegationPool::new(config.max_concurrent_subagents));

    let orchestrator = Orchestrator::new(
        conversation_id,
        memory_key.clone(),
        config,
        Arc::new(llm),
        tool_port,
        memory.clone(),
        event_bus.clone(),
        approval,
        registry,
        pool,
    );

    Harness { orchestrator, memory, memory_key, event_bus }
}
