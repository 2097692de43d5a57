use crate::ws_tests::helpers::{bridge_for, start_test_host};

use bridge_core::ConnectionPhase;
use models::{BatchItem, ErrorCode, RequestOptions};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

/// **VALUE**: Verifies a bridge initializes against a real endpoint and completes
/// a request over WebSocket.
///
/// **WHY THIS MATTERS**: Exercises the full stack: config URL, tungstenite client,
/// JSON framing, handshake, router and response correlation.
#[tokio::test]
async fn given_running_host_when_bridge_requests_then_result_returned() {
    // GIVEN: A host endpoint and an initialized bridge
    let host = start_test_host().await;
    let bridge = bridge_for(&host);
    bridge.initialize().await.expect("initialize over WebSocket");

    // WHEN: A request is sent
    let fields = bridge
        .request("getFields", Value::Null, RequestOptions::default())
        .await
        .expect("getFields");

    // THEN: The host's result comes back and is counted
    assert_eq!(fields[0]["name"], "title");
    assert_eq!(bridge.phase().await, ConnectionPhase::Connected);
    let metrics = bridge.metrics(Some("getFields")).await;
    assert_eq!(metrics.total_requests, 1);
    assert_eq!(metrics.success_count, 1);

    bridge.disconnect().await;
    host.shutdown().await;
}

/// **VALUE**: Verifies host errors surface as REMOTE_ERROR with the host's message.
#[tokio::test]
async fn given_invalid_params_when_bridge_requests_then_remote_error() {
    let host = start_test_host().await;
    let bridge = bridge_for(&host);
    bridge.initialize().await.expect("initialize");

    let error = bridge
        .request("validate", json!({ "name": "" }), RequestOptions::default())
        .await
        .expect_err("validation fails");

    assert_eq!(error.code(), ErrorCode::RemoteError);
    assert!(error.to_string().contains("name is required"));

    bridge.disconnect().await;
    host.shutdown().await;
}

/// **VALUE**: Verifies batch results come back in input order even when the host
/// finishes them out of order.
#[tokio::test]
async fn given_batch_with_uneven_latency_when_executed_then_input_order_kept() {
    let host = start_test_host().await;
    let bridge = bridge_for(&host);
    bridge.initialize().await.expect("initialize");

    let results = bridge
        .batch(vec![
            BatchItem::new("slowEcho", json!({ "delayMs": 200, "tag": "first" })),
            BatchItem::new("echo", json!({ "tag": "second" })),
        ])
        .await
        .expect("batch");

    assert_eq!(results[0]["tag"], "first");
    assert_eq!(results[1]["tag"], "second");

    bridge.disconnect().await;
    host.shutdown().await;
}

/// **VALUE**: Verifies pushes from the host endpoint reach bridge subscribers.
#[tokio::test]
async fn given_subscription_when_host_emits_then_listener_called() {
    // GIVEN: A subscribed bridge
    let host = start_test_host().await;
    let bridge = bridge_for(&host);
    bridge.initialize().await.expect("initialize");
    let received = Arc::new(Mutex::new(Vec::new()));
    let _subscription = bridge.subscribe("heartbeat", {
        let received = Arc::clone(&received);
        move |payload: &Value| received.lock().expect("lock").push(payload.clone())
    });

    // WHEN: The host emits
    host.emit("heartbeat", json!({ "seq": 1 }));

    // THEN: The listener sees the payload
    let mut seen = Vec::new();
    for _ in 0..50 {
        seen = received.lock().expect("lock").clone();
        if !seen.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(seen, vec![json!({ "seq": 1 })]);

    bridge.disconnect().await;
    host.shutdown().await;
}

/// **VALUE**: Verifies initialize against a closed port fails with HANDSHAKE_FAILED.
#[tokio::test]
async fn given_no_host_when_initialize_then_handshake_failed() {
    // GIVEN: A port that was bound and released
    let host = start_test_host().await;
    let bridge = bridge_for(&host);
    host.shutdown().await;

    // WHEN/THEN: initialize() fails
    let error = bridge.initialize().await.expect_err("nothing listening");
    assert_eq!(error.code(), ErrorCode::HandshakeFailed);
}
