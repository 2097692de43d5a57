use crate::ws_tests::helpers::{connect_raw, receive_json, send_json, start_test_host};

use serde_json::json;

/// **VALUE**: Verifies the host answers a request frame with the same correlation id.
///
/// **WHY THIS MATTERS**: This is the wire contract every front-end relies on.
///
/// **BUG THIS CATCHES**: Would catch camelCase field names drifting
/// (`correlation_id` on the wire) or the id not being echoed.
#[tokio::test]
async fn given_request_frame_when_sent_then_correlated_result_returned() {
    // GIVEN: A running host and a raw client
    let host = start_test_host().await;
    let mut ws = connect_raw(&host).await;

    // WHEN: The client sends a request frame
    let id = "0b7e2a6c-3a52-4c1e-9d7e-1f0f2f7e9a11";
    send_json(
        &mut ws,
        &json!({ "correlationId": id, "method": "echo", "params": { "x": 1 } }),
    )
    .await;

    // THEN: The response carries the id and the result
    let response = receive_json(&mut ws).await;
    assert_eq!(response["correlationId"], id);
    assert_eq!(response["result"], json!({ "x": 1 }));
    assert!(response.get("error").is_none());

    host.shutdown().await;
}

/// **VALUE**: Verifies unknown methods and failing handlers become `error` members.
#[tokio::test]
async fn given_unknown_method_when_sent_then_error_response() {
    let host = start_test_host().await;
    let mut ws = connect_raw(&host).await;
    let id = "5c3d0b8e-0000-4000-8000-000000000001";

    send_json(
        &mut ws,
        &json!({ "correlationId": id, "method": "doesNotExist", "params": null }),
    )
    .await;

    let response = receive_json(&mut ws).await;
    assert_eq!(response["correlationId"], id);
    assert_eq!(response["error"]["message"], "Method not found: doesNotExist");
    assert!(response.get("result").is_none());

    host.shutdown().await;
}

/// **VALUE**: Verifies slow handlers do not hold back faster ones on the same connection.
///
/// **BUG THIS CATCHES**: Would catch handlers being awaited inline in the read loop.
#[tokio::test]
async fn given_slow_then_fast_request_when_sent_then_fast_answered_first() {
    let host = start_test_host().await;
    let mut ws = connect_raw(&host).await;
    let slow = "11111111-1111-4111-8111-111111111111";
    let fast = "22222222-2222-4222-8222-222222222222";

    send_json(
        &mut ws,
        &json!({ "correlationId": slow, "method": "slowEcho", "params": { "delayMs": 300 } }),
    )
    .await;
    send_json(
        &mut ws,
        &json!({ "correlationId": fast, "method": "echo", "params": "fast" }),
    )
    .await;

    assert_eq!(receive_json(&mut ws).await["correlationId"], fast);
    assert_eq!(receive_json(&mut ws).await["correlationId"], slow);

    host.shutdown().await;
}

/// **VALUE**: Verifies emitted events reach connected clients as `{event, payload}`.
#[tokio::test]
async fn given_connected_client_when_host_emits_then_push_frame_received() {
    let host = start_test_host().await;
    let mut ws = connect_raw(&host).await;

    // Round-trip first so the connection is registered for broadcasts.
    send_json(
        &mut ws,
        &json!({ "correlationId": "33333333-3333-4333-8333-333333333333", "method": "bridge.ping" }),
    )
    .await;
    receive_json(&mut ws).await;

    let receivers = host.emit("templateSaved", json!({ "id": 7 }));

    let push = receive_json(&mut ws).await;
    assert_eq!(receivers, 1);
    assert_eq!(push, json!({ "event": "templateSaved", "payload": { "id": 7 } }));

    host.shutdown().await;
}
