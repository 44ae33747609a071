//! The `thinking` config gates whether model reasoning deltas are
//! surfaced as `llm_chunk` events; off by default, on when configured.

mod common;

use wren_config::ThinkingLevel;
use wren_events::AgentEvent;
use wren_llm::{SseEvent, Usage};
use wren_runtime::{RuntimeConfig, SendOptions, UserMessagePayload};
use wren_test::MockLlmProvider;

fn reasoning_turn() -> Vec<SseEvent> {
    vec![
        SseEvent::ReasoningDelta("pondering... ".to_string()),
        SseEvent::ContentDelta("42".to_string()),
        SseEvent::StreamFinish {
            finish_reason: Some("stop".to_string()),
            usage: Some(Usage::new(10, 5)),
        },
    ]
}

#[tokio::test]
async fn reasoning_deltas_are_suppressed_when_thinking_is_off() {
    let provider = MockLlmProvider::new("test-model").queue_events(reasoning_turn());
    let harness = common::build_harness(provider, vec![]);
    let mut receiver = harness.event_bus.subscribe();

    harness
        .orchestrator
        .send(UserMessagePayload::Text("what's the answer?".to_string()), SendOptions::default())
        .await
        .unwrap();

    let events = wren_test::drain_available(&mut receiver);
    let reasoning_chunks: Vec<_> = events
        .iter()
        .filter_map(|event| match event.as_ref() {
            AgentEvent::LlmChunk { reasoning: true, delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect();
    assert!(reasoning_chunks.is_empty(), "expected no reasoning chunks, got {reasoning_chunks:?}");

    let content_chunks: Vec<_> = events
        .iter()
        .filter_map(|event| match event.as_ref() {
            AgentEvent::LlmChunk { reasoning: false, delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(content_chunks, vec!["42".to_string()]);
}

#[tokio::test]
async fn reasoning_deltas_are_surfaced_when_thinking_is_enabled() {
    let provider = MockLlmProvider::new("test-model").queue_events(reasoning_turn());
    let mut config = RuntimeConfig::default();
    config.thinking = ThinkingLevel::High;
    let harness = common::build_harness_with_config(provider, vec![], config);
    let mut receiver = harness.event_bus.subscribe();

    harness
        .orchestrator
        .send(UserMessagePayload::Text("what's the answer?".to_string()), SendOptions::default())
        .await
        .unwrap();

    let events = wren_test::drain_available(&mut receiver);
    let reasoning_chunks: Vec<_> = events
        .iter()
        .filter_map(|event| match event.as_ref() {
            AgentEvent::LlmChunk { reasoning: true, delta, .. } => Some(delta.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(reasoning_chunks, vec!["pondering... ".to_string()]);
}
