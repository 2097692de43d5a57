use super::helpers::free_port;

use bridge_cli::commands::{HEARTBEAT_EVENT, serve};

use bridge_core::{Bridge, BridgeConfig};
use models::RequestOptions;

use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};

/// Initialize, retrying while the endpoint is still binding.
async fn connect_when_ready(bridge: &Bridge) {
    for _ in 0..50 {
        if bridge.initialize().await.is_ok() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("serve endpoint never came up");
}

/// **VALUE**: Verifies `serve` answers demo methods over a real socket, pushes heartbeats,
/// and returns once shutdown resolves.
///
/// **WHY THIS MATTERS**: `serve` is the counterpart users run next to `call`/`watch`;
/// all three must interoperate over the default WebSocket transport.
///
/// **BUG THIS CATCHES**: Would catch heartbeats sent with the wrong event name, or a serve
/// loop that ignores its shutdown future.
#[tokio::test]
async fn given_serve_running_when_bridge_connects_then_methods_and_heartbeats_work() {
    // GIVEN: serve on a free port with a fast heartbeat
    let port = free_port();
    let (stop, stopped) = oneshot::channel::<()>();
    let serving = tokio::spawn(serve(
        port,
        Some(Duration::from_millis(50)),
        async move {
            let _ = stopped.await;
        },
    ));

    // AND: A bridge subscribed to heartbeats
    let bridge = Bridge::websocket(BridgeConfig {
        url: format!("ws://127.0.0.1:{port}"),
        timeout_ms: 2_000,
        ..Default::default()
    })
    .unwrap();
    connect_when_ready(&bridge).await;

    let (beats_tx, mut beats) = mpsc::unbounded_channel::<Value>();
    let subscription = bridge.subscribe(HEARTBEAT_EVENT, move |payload| {
        let _ = beats_tx.send(payload.clone());
    });

    // WHEN: Calling echo and waiting for a heartbeat
    let echoed = bridge
        .request("echo", json!({ "ping": true }), RequestOptions::default())
        .await
        .unwrap();
    let beat = timeout(Duration::from_secs(2), beats.recv())
        .await
        .expect("heartbeat within 2s")
        .expect("heartbeat channel open");

    // THEN
    assert_eq!(echoed, json!({ "ping": true }));
    assert!(beat["sequence"].as_u64().unwrap() >= 1);
    assert!(beat["timestamp"].is_string());

    // AND: Shutdown stops serve cleanly
    subscription.unsubscribe();
    bridge.disconnect().await;
    stop.send(()).unwrap();
    let result = timeout(Duration::from_secs(2), serving)
        .await
        .expect("serve should stop")
        .unwrap();
    assert!(result.is_ok());
}

/// **VALUE**: Verifies a port that is already taken fails with a Host error.
///
/// **WHY THIS MATTERS**: A second `serve` on the same port must exit with an error
/// instead of hanging.
///
/// **BUG THIS CATCHES**: Would catch bind failures being swallowed.
#[tokio::test]
async fn given_port_in_use_when_serving_then_host_error() {
    // GIVEN: A listener holding the port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // WHEN
    let result = serve(port, None, async {}).await;

    // THEN
    assert!(matches!(
        result,
        Err(bridge_cli::error::CliError::Host { .. })
    ));
}
