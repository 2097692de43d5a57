use super::helpers::manual_bridge;

use bridge_cli::commands::watch;

use std::time::Duration;

use serde_json::json;
use tokio::sync::oneshot;
use tokio::time::sleep;

/// **VALUE**: Verifies `watch` counts only the events it subscribed to and stops on shutdown.
///
/// **WHY THIS MATTERS**: The command must not miss pushes for its events nor log unrelated
/// ones, and Ctrl-C must end it cleanly.
///
/// **BUG THIS CATCHES**: Would catch subscriptions registered under the wrong name, or a
/// watch that ignores its shutdown future.
#[tokio::test(start_paused = true)]
async fn given_watching_heartbeat_when_host_pushes_events_then_only_heartbeats_counted() {
    // GIVEN: A watch on heartbeat with a manual host
    let (bridge, mut host) = manual_bridge();
    let (stop, stopped) = oneshot::channel::<()>();
    let events = vec!["heartbeat".to_string()];

    let watching = tokio::spawn({
        let bridge = bridge.clone();
        async move {
            watch(&bridge, &events, async move {
                let _ = stopped.await;
            })
            .await
        }
    });

    let mut link = host.accept().await.expect("watch should connect");
    link.complete_handshake().await.expect("handshake");
    sleep(Duration::from_millis(5)).await;

    // WHEN: The host pushes two heartbeats and one unrelated event
    link.emit("heartbeat", json!({ "sequence": 1 }));
    link.emit("fieldChanged", json!({ "field": "title" }));
    link.emit("heartbeat", json!({ "sequence": 2 }));
    sleep(Duration::from_millis(5)).await;

    // AND: Shutdown is requested
    stop.send(()).unwrap();
    let received = watching.await.unwrap().unwrap();

    // THEN: Only the heartbeats were counted
    assert_eq!(received, 2);
}
