//! Scenario 6: cancellation mid-stream (via a deadline) preserves whatever
//! partial assistant content had already been streamed.

mod common;

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use futures::StreamExt;
use wren_core::CancelToken;
use wren_events::AgentEvent;
use wren_llm::{LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, SseEvent, StreamBox};
use wren_runtime::{RuntimeError, SendOptions, UserMessagePayload};
use wren_test::drain_available;

const CHUNK_DELAY: Duration = Duration::from_millis(60);

/// Streams five content chunks, each after a fixed delay, so a deadline
/// landing after the third chunk reliably lands before the fourth.
struct SlowStreamProvider;

#[async_trait]
impl LlmProvider for SlowStreamProvider {
    fn name(&self) -> &str {
        "slow-stream"
    }

    fn model(&self) -> &str {
        "slow-model"
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
        _cancel: &CancelToken,
    ) -> LlmResult<StreamBox> {
        let chunks = vec!["one ", "two ", "three ", "four ", "five "];
        let paced = stream::unfold(chunks.into_iter(), |mut remaining| async move {
            let chunk = remaining.next()?;
            tokio::time::sleep(CHUNK_DELAY).await;
            Some((Ok(SseEvent::ContentDelta(chunk.to_string())), remaining))
        });
        let finish = stream::once(async {
            Ok(SseEvent::StreamFinish { finish_reason: Some("stop".to_string()), usage: None })
        });
        let combined: Pin<Box<dyn Stream<Item = LlmResult<SseEvent>> + Send>> = Box::pin(paced.chain(finish));
        Ok(combined)
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
        _cancel: &CancelToken,
    ) -> LlmResult<LlmResponse> {
        unimplemented!("not exercised by this test")
    }

    fn max_context_length(&self) -> usize {
        128_000
    }
}

#[tokio::test]
async fn deadline_mid_stream_preserves_the_partial_assistant_message() {
    let harness = common::build_custom_harness(SlowStreamProvider, vec![]);
    let mut receiver = harness.event_bus.subscribe();

    // Three chunks land at ~60ms, ~120ms, ~180ms; a deadline of 210ms lands
    // comfortably after the third and well before the fourth (~240ms).
    let opts = SendOptions { deadline: Some(Duration::from_millis(210)) };
    let result = harness
        .orchestrator
        .send(UserMessagePayload::Text("hi".to_string()), opts)
        .await;

    assert!(matches!(result, Err(RuntimeError::Aborted(_))), "expected Aborted, got {result:?}");

    let events = drain_available(&mut receiver);
    let chunk_count = events.iter().filter(|event| event.event_type() == "llm_chunk").count();
    assert_eq!(chunk_count, 3, "expected exactly the three chunks that land before the deadline");
    assert!(
        events.iter().any(|event| matches!(event.as_ref(), AgentEvent::Error { kind, .. } if kind == "aborted")),
        "expected a final error(aborted) event"
    );

    // Give the fire-and-forget partial-memory-persist task a moment to land.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let history = harness.memory.get(&harness.memory_key).await.unwrap();
    assert_eq!(history.len(), 2, "expected [user, partial assistant]");
    assert_eq!(history[0].content.as_text(), "hi");
    assert_eq!(history[1].content.as_text(), "one two three ");
}
