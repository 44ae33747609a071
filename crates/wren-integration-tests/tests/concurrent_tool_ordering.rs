//! Scenario 3: two concurrent tool calls in one turn; memory preserves call
//! order even though the tools complete out of order.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use wren_llm::MessageRole;
use wren_runtime::{SendOptions, UserMessagePayload};
use wren_test::MockLlmProvider;
use wren_tools::{BuiltinTool, ToolContext};

struct SleepTool {
    name: &'static str,
    millis: u64,
}

#[async_trait]
impl BuiltinTool for SleepTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "sleeps then reports its own name"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<Value, String> {
        tokio::time::sleep(Duration::from_millis(self.millis)).await;
        Ok(serde_json::json!(self.name))
    }
}

#[tokio::test]
async fn tool_messages_preserve_call_order_despite_out_of_order_completion() {
    let llm = MockLlmProvider::new("test-model")
        .queue_events(vec![
            wren_llm::SseEvent::ToolCallDelta { index: 0, id: Some("a".to_string()), name: Some("slow".to_string()), arguments_so_far: "{}".to_string() },
            wren_llm::SseEvent::ToolCallDelta { index: 1, id: Some("b".to_string()), name: Some("fast".to_string()), arguments_so_far: "{}".to_string() },
            wren_llm::SseEvent::StreamFinish { finish_reason: Some("tool_calls".to_string()), usage: Some(wren_llm::Usage::new(10, 5)) },
        ])
        .queue_text("done");

    let tools: Vec<Arc<dyn BuiltinTool>> = vec![
        Arc::new(SleepTool { name: "slow", millis: 50 }),
        Arc::new(SleepTool { name: "fast", millis: 10 }),
    ];
    let harness = common::build_harness(llm, tools);
    let mut receiver = harness.event_bus.subscribe();

    harness
        .orchestrator
        .send(UserMessagePayload::Text("go".to_string()), SendOptions::default())
        .await
        .unwrap();

    let history = harness.memory.get(&harness.memory_key).await.unwrap();
    let tool_messages: Vec<_> = history.iter().filter(|m| m.role == MessageRole::Tool).collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("a"));
    assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("b"));

    let completion_order: Vec<String> = wren_test::drain_available(&mut receiver)
        .into_iter()
        .filter_map(|event| match event.as_ref() {
            wren_events::AgentEvent::ToolResult { result, .. } => Some(result.id.as_str().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(completion_order, vec!["b".to_string(), "a".to_string()]);
}
