//! Scenario 1: a plain chat turn with no tool calls.

mod common;

use std::time::Duration;

use wren_events::AgentEvent;
use wren_runtime::{SendOptions, UserMessagePayload};
use wren_test::{recv_matching, MockLlmProvider};

#[tokio::test]
async fn plain_chat_streams_the_expected_event_sequence_and_memory() {
    let llm = MockLlmProvider::new("test-model").queue_text("hello");
    let harness = common::build_harness(llm, vec![]);
    let mut receiver = harness.event_bus.subscribe();

    let outcome = harness
        .orchestrator
        .send(UserMessagePayload::Text("hi".to_string()), SendOptions::default())
        .await
        .unwrap();
    assert_eq!(outcome.usage.prompt_tokens, 10);

    let timeout = Duration::from_millis(500);
    recv_matching(&mut receiver, timeout, |e| e.event_type() == "message_started").await;
    recv_matching(&mut receiver, timeout, |e| e.event_type() == "llm_call_started").await;
    let chunk = recv_matching(&mut receiver, timeout, |e| e.event_type() == "llm_chunk").await;
    match chunk.as_ref() {
        AgentEvent::LlmChunk { delta, .. } => assert_eq!(delta, "hello"),
        other => panic!("expected llm_chunk, got {other:?}"),
    }
    recv_matching(&mut receiver, timeout, |e| e.event_type() == "llm_call_completed").await;
    let assistant = recv_matching(&mut receiver, timeout, |e| e.event_type() == "assistant_message").await;
    match assistant.as_ref() {
        AgentEvent::AssistantMessage { content, had_tool_calls, .. } => {
            assert_eq!(content.as_deref(), Some("hello"));
            assert!(!had_tool_calls);
        }
        other => panic!("expected assistant_message, got {other:?}"),
    }
    recv_matching(&mut receiver, timeout, |e| e.event_type() == "done").await;

    let history = harness.memory.get(&harness.memory_key).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content.as_text(), "hi");
    assert_eq!(history[1].content.as_text(), "hello");
}
