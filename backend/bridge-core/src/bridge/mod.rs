//! Caller-facing bridge handle.
//!
//! [`Bridge`] is a cheap, cloneable handle. Every operation is turned into a
//! [`BridgeCommand`] for the actor (see [`actor`]) and, where a result is
//! expected, awaited through a `oneshot` reply. Issuing a command never blocks.
//!
//! # Lifecycle
//!
//! 1. [`Bridge::initialize`] connects the transport, runs the handshake and
//!    starts the health monitor
//! 2. [`Bridge::request`], [`Bridge::queue_request`], [`Bridge::batch`] and
//!    [`Bridge::subscribe`] are usable while initialized
//! 3. [`Bridge::disconnect`] rejects everything outstanding and returns to the
//!    uninitialized state; `initialize()` may be called again afterwards

mod actor;
mod batch;
mod command;
pub(crate) mod events;
pub(crate) mod health;
pub(crate) mod metrics;
mod monitor;
mod pending;
pub(crate) mod queue;
pub(crate) mod retry;

pub use command::ConnectionPhase;
pub use events::ListenerId;

use crate::bridge::actor::BridgeActor;
use crate::bridge::command::{BridgeCommand, Outcome, SendKind, SendRequest};
use crate::config::BridgeConfig;
use crate::error::bridge::BridgeError;
use crate::error::config::ConfigError;
use crate::transport::{Transport, WsTransport};

use models::{
    HANDSHAKE_METHOD, HealthStatus, MAX_TIMEOUT, MethodMetrics, PING_METHOD, PROTOCOL_VERSION,
    RequestOptions,
};

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{Mutex, Notify, oneshot};

/// Handle to one bridge instance. Clones share the same state.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

struct BridgeInner {
    config: BridgeConfig,
    transport: Arc<dyn Transport>,
    commands: OnceLock<UnboundedSender<BridgeCommand>>,
    /// Serializes initialize / recovery / disconnect.
    lifecycle: Mutex<()>,
    recovery: Arc<Notify>,
    next_listener: AtomicU64,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("transport", &self.inner.transport.describe())
            .field("actor_started", &self.inner.commands.get().is_some())
            .finish()
    }
}

/// Weak reference held by the health monitor so it never keeps a bridge alive.
#[derive(Clone)]
pub(crate) struct WeakBridge(Weak<BridgeInner>);

impl WeakBridge {
    pub fn upgrade(&self) -> Option<Bridge> {
        self.0.upgrade().map(|inner| Bridge { inner })
    }
}

impl Bridge {
    /// Bridge over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `config` fails
    /// [`BridgeConfig::validate`].
    pub fn new(config: BridgeConfig, transport: impl Transport) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(BridgeInner {
                config,
                transport: Arc::new(transport),
                commands: OnceLock::new(),
                lifecycle: Mutex::new(()),
                recovery: Arc::new(Notify::new()),
                next_listener: AtomicU64::new(1),
            }),
        })
    }

    /// Bridge over WebSocket to `config.url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the URL is not a `ws://` or
    /// `wss://` URL or any other value fails validation.
    pub fn websocket(config: BridgeConfig) -> Result<Self, ConfigError> {
        let transport = WsTransport::new(config.parsed_url()?);
        Self::new(config, transport)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.inner.config
    }

    pub(crate) fn downgrade(&self) -> WeakBridge {
        WeakBridge(Arc::downgrade(&self.inner))
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Connect, handshake and start health probing.
    ///
    /// Returns immediately if already connected. On a bridge that lost its
    /// connection this performs a recovery instead.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HandshakeFailed`] if the transport cannot connect
    /// or the host does not complete the handshake. Not retried.
    pub async fn initialize(&self) -> Result<(), BridgeError> {
        let _lifecycle = self.inner.lifecycle.lock().await;

        match self.phase().await {
            ConnectionPhase::Connected => {
                debug!("initialize() on a connected bridge, nothing to do");
                return Ok(());
            }
            ConnectionPhase::Degraded => {
                self.reconnect().await?;
                self.post(BridgeCommand::MarkConnected { monitor: None });
                return Ok(());
            }
            ConnectionPhase::Uninitialized => {}
        }

        self.reconnect().await?;

        let monitor = monitor::spawn(
            self.downgrade(),
            self.inner.config.health_check_interval(),
            Arc::clone(&self.inner.recovery),
        );
        self.post(BridgeCommand::MarkConnected {
            monitor: Some(monitor),
        });

        info!(
            "Bridge initialized over {}",
            self.inner.transport.describe()
        );
        Ok(())
    }

    /// Re-run the connection handshake on a bridge that lost its connection.
    ///
    /// Normally driven by the health monitor. Success marks the bridge connected
    /// and clears `consecutiveFailures`; failure leaves it disconnected until the
    /// next probe interval.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Disconnected`] on a bridge that was never
    /// initialized, or [`BridgeError::HandshakeFailed`] if the reconnect fails.
    pub async fn attempt_recovery(&self) -> Result<(), BridgeError> {
        let _lifecycle = self.inner.lifecycle.lock().await;

        match self.phase().await {
            ConnectionPhase::Uninitialized => Err(BridgeError::disconnected(HANDSHAKE_METHOD)),
            ConnectionPhase::Connected => Ok(()),
            ConnectionPhase::Degraded => {
                info!("Attempting recovery over {}", self.inner.transport.describe());
                self.reconnect().await?;
                self.post(BridgeCommand::MarkConnected { monitor: None });
                info!("Bridge recovered");
                Ok(())
            }
        }
    }

    /// Stop probing, reject every outstanding and queued request with
    /// [`BridgeError::Disconnected`] and return to the uninitialized state.
    ///
    /// Metrics survive a disconnect.
    pub async fn disconnect(&self) {
        let _lifecycle = self.inner.lifecycle.lock().await;

        let (reply, done) = oneshot::channel();
        if self.post(BridgeCommand::Disconnect(reply)) {
            let _ = done.await;
        }
        info!("Bridge disconnected");
    }

    pub async fn phase(&self) -> ConnectionPhase {
        let (reply, phase) = oneshot::channel();
        if !self.post(BridgeCommand::Phase(reply)) {
            return ConnectionPhase::Uninitialized;
        }
        phase.await.unwrap_or(ConnectionPhase::Uninitialized)
    }

    /// Open a new link and complete the handshake on it.
    async fn reconnect(&self) -> Result<(), BridgeError> {
        let config = &self.inner.config;

        let link = self.inner.transport.connect().await.map_err(|e| {
            warn!("Connect to {} failed: {}", self.inner.transport.describe(), e);
            BridgeError::handshake(format!(
                "Could not connect to {}: {e}",
                self.inner.transport.describe()
            ))
        })?;

        self.post(BridgeCommand::Attach(link));

        let reply = self
            .call(
                HANDSHAKE_METHOD,
                json!({ "protocolVersion": PROTOCOL_VERSION }),
                config.handshake_timeout(),
                0,
                SendKind::Handshake,
            )
            .await;

        let checked = match reply {
            Ok(reply) => check_protocol_version(&reply),
            Err(e) => Err(BridgeError::handshake(format!("Handshake failed: {e}"))),
        };

        if let Err(e) = checked {
            self.post(BridgeCommand::Detach);
            return Err(e);
        }
        Ok(())
    }

    // ============================================
    // REQUESTS
    // ============================================

    /// Send one request and wait for its outcome.
    ///
    /// With `options.priority` set the request goes through the priority queue;
    /// otherwise it is dispatched immediately. `options.timeout` replaces the
    /// configured base timeout and is clamped to [`MAX_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Remote`] if the host answered with an error (never retried)
    /// - [`BridgeError::Timeout`] once every retry timed out
    /// - [`BridgeError::Disconnected`] if the bridge is not initialized or is torn down meanwhile
    pub async fn request(
        &self,
        method: impl Into<String>,
        params: Value,
        options: RequestOptions,
    ) -> Result<Value, BridgeError> {
        let config = &self.inner.config;
        let method = method.into();
        let timeout = match options.timeout {
            Some(timeout) if timeout > MAX_TIMEOUT => {
                warn!("Timeout {timeout:?} for {method} exceeds {MAX_TIMEOUT:?}, clamping");
                MAX_TIMEOUT
            }
            Some(timeout) => timeout,
            None => config.timeout(),
        };

        match options.priority {
            Some(priority) => {
                self.enqueue(method, params, priority, timeout)
                    .await
            }
            None => {
                self.call(method, params, timeout, config.max_retries, SendKind::Request)
                    .await
            }
        }
    }

    /// Put a request on the priority queue and return without waiting.
    ///
    /// The returned [`QueuedRequest`] resolves with the outcome; dropping it
    /// does not take the entry off the queue.
    pub fn queue_request(
        &self,
        method: impl Into<String>,
        params: Value,
        priority: i32,
    ) -> QueuedRequest {
        self.enqueue(method.into(), params, priority, self.inner.config.timeout())
    }

    fn enqueue(
        &self,
        method: String,
        params: Value,
        priority: i32,
        timeout: Duration,
    ) -> QueuedRequest {
        let (reply, receiver) = oneshot::channel();
        let request = SendRequest {
            method: method.clone(),
            params,
            timeout,
            max_retries: self.inner.config.max_retries,
            kind: SendKind::Request,
            reply,
        };
        self.post(BridgeCommand::Enqueue { priority, request });
        QueuedRequest { method, receiver }
    }

    pub(crate) async fn call(
        &self,
        method: impl Into<String>,
        params: Value,
        timeout: Duration,
        max_retries: u32,
        kind: SendKind,
    ) -> Outcome {
        let method = method.into();
        let (reply, receiver) = oneshot::channel();
        let request = SendRequest {
            method: method.clone(),
            params,
            timeout,
            max_retries,
            kind,
            reply,
        };

        if !self.post(BridgeCommand::Send(request)) {
            return Err(BridgeError::disconnected(method));
        }
        receiver
            .await
            .unwrap_or_else(|_| Err(BridgeError::disconnected(method)))
    }

    /// One liveness probe with the configured ping timeout and retry budget.
    pub(crate) async fn ping(&self) -> Outcome {
        let config = &self.inner.config;
        self.call(
            PING_METHOD,
            Value::Null,
            config.ping_timeout(),
            config.ping_max_retries,
            SendKind::Probe,
        )
        .await
    }

    // ============================================
    // OBSERVATION
    // ============================================

    /// Aggregate for `method`, or across all methods for `None`.
    pub async fn metrics(&self, method: Option<&str>) -> MethodMetrics {
        let (reply, receiver) = oneshot::channel();
        let command = BridgeCommand::Metrics {
            method: method.map(str::to_string),
            reply,
        };
        if !self.post(command) {
            return MethodMetrics::default();
        }
        receiver.await.unwrap_or_default()
    }

    pub async fn health_status(&self) -> HealthStatus {
        let (reply, receiver) = oneshot::channel();
        if !self.post(BridgeCommand::Health(reply)) {
            return HealthStatus::default();
        }
        receiver.await.unwrap_or_default()
    }

    /// Register `listener` for pushes named `event`.
    ///
    /// Listeners for the same event run in registration order on the bridge
    /// actor and must not block.
    pub fn subscribe<F>(&self, event: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        let event = event.into();

        self.post(BridgeCommand::Subscribe {
            id,
            event: event.clone(),
            listener: Arc::new(listener),
        });

        Subscription {
            id,
            event,
            commands: self.commands().downgrade(),
        }
    }

    // ============================================
    // ACTOR PLUMBING
    // ============================================

    /// Command channel, spawning the actor on first use.
    ///
    /// # Panics
    ///
    /// Panics if first called outside a tokio runtime.
    fn commands(&self) -> &UnboundedSender<BridgeCommand> {
        self.inner.commands.get_or_init(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            let actor = BridgeActor::new(
                &self.inner.config,
                sender.downgrade(),
                Arc::clone(&self.inner.recovery),
            );
            tokio::spawn(actor.run(receiver));
            debug!("Bridge actor spawned");
            sender
        })
    }

    fn post(&self, command: BridgeCommand) -> bool {
        self.commands().send(command).is_ok()
    }
}

fn check_protocol_version(reply: &Value) -> Result<(), BridgeError> {
    match reply.get("protocolVersion").and_then(Value::as_u64) {
        Some(version) if version == u64::from(PROTOCOL_VERSION) => Ok(()),
        Some(version) => Err(BridgeError::handshake(format!(
            "Host speaks protocol version {version}, expected {PROTOCOL_VERSION}"
        ))),
        None => Err(BridgeError::handshake(format!(
            "Handshake reply carries no protocolVersion: {reply}"
        ))),
    }
}

/// Outcome of a queued request.
#[derive(Debug)]
#[must_use = "a queued request is still dispatched when dropped, but its outcome is lost"]
pub struct QueuedRequest {
    method: String,
    receiver: oneshot::Receiver<Outcome>,
}

impl QueuedRequest {
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Future for QueuedRequest {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => {
                Poll::Ready(Err(BridgeError::disconnected(self.method.clone())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Registration returned by [`Bridge::subscribe`].
///
/// Dropping it keeps the listener registered; call [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    event: String,
    commands: WeakUnboundedSender<BridgeCommand>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn unsubscribe(self) {
        if let Some(commands) = self.commands.upgrade() {
            let _ = commands.send(BridgeCommand::Unsubscribe(self.id));
        }
    }
}
