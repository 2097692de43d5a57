//! Test helpers for WebSocket integration tests.
//!
//! - Starting a host endpoint with a small method table on a free port
//! - Connecting a raw WebSocket client for wire-level checks
//! - Building a bridge pointed at the endpoint

use bridge_core::host::{HostHandle, MethodRouter, start_host_server};
use bridge_core::{Bridge, BridgeConfig};

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Router with the methods the tests call.
pub fn test_router() -> MethodRouter {
    MethodRouter::new()
        .route("echo", |params| async move { Ok(params) })
        .route("getFields", |_| async {
            Ok(json!([{ "name": "title" }, { "name": "body" }]))
        })
        .route("slowEcho", |params: Value| async move {
            let delay = params.get("delayMs").and_then(Value::as_u64).unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(params)
        })
        .route("validate", |params: Value| async move {
            match params.get("name").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => Ok(json!({ "valid": true })),
                _ => Err("name is required".to_string()),
            }
        })
}

/// Start a host endpoint on a free port.
pub async fn start_test_host() -> HostHandle {
    start_host_server(0, test_router())
        .await
        .expect("Failed to start host endpoint")
}

pub fn bridge_for(host: &HostHandle) -> Bridge {
    let config = BridgeConfig {
        url: host.url(),
        timeout_ms: 2_000,
        max_retries: 1,
        ..Default::default()
    };
    Bridge::websocket(config).expect("valid ws url")
}

pub async fn connect_raw(host: &HostHandle) -> Client {
    let (ws_stream, _) = connect_async(host.url())
        .await
        .expect("Failed to connect to WebSocket server");
    ws_stream
}

pub async fn send_json(ws: &mut Client, value: &Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send message");
}

/// Next text frame as JSON, within two seconds.
pub async fn receive_json(ws: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed")
            .expect("Error receiving message");

        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}
