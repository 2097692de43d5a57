//! Method routing for the host endpoint.

use models::{
    HANDSHAKE_METHOD, OutgoingFrame, PING_METHOD, PROTOCOL_VERSION, RemoteError, ResponseFrame,
};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use log::{debug, warn};
use serde_json::{Value, json};

/// JSON-RPC style code reported for an unknown method.
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// Maps method names to async handlers.
///
/// The two reserved bridge methods (handshake and ping) are answered here and
/// cannot be overridden. Cloning is cheap; clones share the handler table.
#[derive(Clone, Default)]
pub struct MethodRouter {
    handlers: Arc<HashMap<String, Handler>>,
}

impl MethodRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F, Fut>(mut self, method: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |params| Box::pin(handler(params)));
        Arc::make_mut(&mut self.handlers).insert(method.into(), handler);
        self
    }

    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    /// Run the handler for `frame` and build the correlated response.
    pub async fn dispatch(&self, frame: OutgoingFrame) -> ResponseFrame {
        let OutgoingFrame {
            correlation_id,
            method,
            params,
        } = frame;

        match method.as_str() {
            HANDSHAKE_METHOD => {
                debug!("Handshake from client (params: {})", params);
                return ResponseFrame::success(
                    correlation_id,
                    json!({ "protocolVersion": PROTOCOL_VERSION }),
                );
            }
            PING_METHOD => return ResponseFrame::success(correlation_id, Value::Null),
            _ => {}
        }

        let Some(handler) = self.handlers.get(&method) else {
            warn!("No handler registered for {}", method);
            return ResponseFrame::failure(
                correlation_id,
                RemoteError {
                    message: format!("Method not found: {method}"),
                    code: Some(METHOD_NOT_FOUND_CODE),
                },
            );
        };

        match handler(params).await {
            Ok(result) => ResponseFrame::success(correlation_id, result),
            Err(message) => {
                debug!("Handler for {} failed: {}", method, message);
                ResponseFrame::failure(correlation_id, RemoteError::new(message))
            }
        }
    }
}

impl std::fmt::Debug for MethodRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodRouter")
            .field("methods", &self.methods())
            .finish()
    }
}
