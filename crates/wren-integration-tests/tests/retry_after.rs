//! Scenario 4: a 429 carrying `Retry-After: 1` is retried after honoring
//! that delay, and the eventual 200 completes the turn.

mod common;

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use wren_llm::OpenAiCompatProvider;
use wren_runtime::{SendOptions, UserMessagePayload};

const RATE_LIMITED_RESPONSE: &str =
    "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 1\r\nConnection: close\r\nContent-Length: 2\r\n\r\n{}";

const STREAM_BODY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n";

fn success_response() -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nContent-Length: {}\r\n\r\n{}",
        STREAM_BODY.len(),
        STREAM_BODY
    )
}

/// Accepts connections one at a time, answering the first with `response`
/// and recording the [`tokio::time::Instant`] each connection arrived at.
async fn serve_sequence(listener: TcpListener, timestamps: Arc<Mutex<Vec<tokio::time::Instant>>>) {
    loop {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        timestamps.lock().await.push(tokio::time::Instant::now());

        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;

        let attempt = timestamps.lock().await.len();
        let response = if attempt == 1 { RATE_LIMITED_RESPONSE.to_string() } else { success_response() };
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.flush().await;

        if attempt >= 2 {
            return;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn retry_after_header_is_honored_before_the_second_attempt() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let timestamps = Arc::new(Mutex::new(Vec::new()));
    let server_timestamps = timestamps.clone();
    let server = tokio::spawn(serve_sequence(listener, server_timestamps));

    let provider = OpenAiCompatProvider::custom(&format!("http://{addr}"), None, "test-model");
    let harness = common::build_custom_harness(provider, vec![]);

    let result = harness
        .orchestrator
        .send(UserMessagePayload::Text("hi".to_string()), SendOptions::default())
        .await;
    assert!(result.is_ok(), "expected the retried request to eventually succeed: {result:?}");

    server.await.expect("mock server task panicked");

    let timestamps = timestamps.lock().await;
    assert_eq!(timestamps.len(), 2, "expected exactly two POSTs, one rate-limited and one that succeeded");
    let elapsed = timestamps[1] - timestamps[0];
    assert!(
        elapsed >= std::time::Duration::from_secs(1),
        "expected the second attempt at least 1s after the first, got {elapsed:?}"
    );
}
