//! The bridge actor.
//!
//! Owns every piece of mutable bridge state: the pending table, the priority
//! queue, health, metrics, subscriptions and the current link. Commands are
//! processed one at a time and `handle` never awaits, so no state is ever
//! touched concurrently and no handler can re-enter another.
//!
//! Timers are plain tasks that sleep and post a command back. They hold only a
//! weak sender, so the actor stops once the last [`Bridge`](crate::Bridge)
//! handle is gone.

use crate::bridge::command::{BridgeCommand, ConnectionPhase, SendKind, SendRequest};
use crate::bridge::events::EventBus;
use crate::bridge::health::HealthTracker;
use crate::bridge::metrics::MetricsCollector;
use crate::bridge::pending::{PendingOperation, PendingTable};
use crate::bridge::queue::RequestQueue;
use crate::bridge::retry::{RetryPolicy, attempt_timeout};
use crate::config::BridgeConfig;
use crate::error::bridge::BridgeError;
use crate::transport::TransportLink;

use models::{CorrelationId, IncomingFrame, OutgoingFrame, ResponseFrame};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::sync::Notify;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::JoinHandle;

struct ActiveLink {
    outbound: UnboundedSender<OutgoingFrame>,
    generation: u64,
    pump: JoinHandle<()>,
}

pub(crate) struct BridgeActor {
    commands: WeakUnboundedSender<BridgeCommand>,
    recovery: Arc<Notify>,
    policy: RetryPolicy,
    drain_delay: Duration,
    debug_frames: bool,

    pending: PendingTable,
    queue: RequestQueue<SendRequest>,
    draining: bool,
    drain_timer: Option<JoinHandle<()>>,
    health: HealthTracker,
    metrics: MetricsCollector,
    events: EventBus,

    link: Option<ActiveLink>,
    generation: u64,
    initialized: bool,
    monitor: Option<JoinHandle<()>>,
}

impl BridgeActor {
    pub fn new(
        config: &BridgeConfig,
        commands: WeakUnboundedSender<BridgeCommand>,
        recovery: Arc<Notify>,
    ) -> Self {
        Self {
            commands,
            recovery,
            policy: RetryPolicy::from_config(config),
            drain_delay: config.queue_drain_delay(),
            debug_frames: config.debug,
            pending: PendingTable::default(),
            queue: RequestQueue::default(),
            draining: false,
            drain_timer: None,
            health: HealthTracker::new(config.failure_threshold),
            metrics: MetricsCollector::default(),
            events: EventBus::default(),
            link: None,
            generation: 0,
            initialized: false,
            monitor: None,
        }
    }

    pub async fn run(mut self, mut receiver: UnboundedReceiver<BridgeCommand>) {
        debug!("Bridge actor started");

        while let Some(command) = receiver.recv().await {
            trace!("Bridge command: {:?}", command);
            self.handle(command);
        }

        self.teardown();
        debug!("Bridge actor stopped");
    }

    fn handle(&mut self, command: BridgeCommand) {
        match command {
            BridgeCommand::Send(request) => self.dispatch(request),
            BridgeCommand::Enqueue { priority, request } => self.enqueue(priority, request),
            BridgeCommand::DrainNext => self.drain_next(),
            BridgeCommand::Inbound(IncomingFrame::Response(frame)) => self.on_response(frame),
            BridgeCommand::Inbound(IncomingFrame::Event(frame)) => {
                if self.debug_frames {
                    debug!("<- event {} {}", frame.event, frame.payload);
                }
                self.events.dispatch(&frame.event, &frame.payload);
            }
            BridgeCommand::LinkClosed { generation } => self.on_link_closed(generation),
            BridgeCommand::AttemptTimedOut { id, attempt } => self.on_attempt_timeout(id, attempt),
            BridgeCommand::Retransmit { id, attempt } => self.on_retransmit(id, attempt),
            BridgeCommand::Attach(link) => self.attach(link),
            BridgeCommand::Detach => self.detach(),
            BridgeCommand::MarkConnected { monitor } => {
                self.initialized = true;
                self.health.mark_connected();
                if let Some(monitor) = monitor {
                    if let Some(previous) = self.monitor.replace(monitor) {
                        previous.abort();
                    }
                }
                info!("Bridge connected");
            }
            BridgeCommand::Subscribe {
                id,
                event,
                listener,
            } => self.events.subscribe(id, event, listener),
            BridgeCommand::Unsubscribe(id) => {
                if !self.events.unsubscribe(id) {
                    debug!("Listener {:?} was already removed", id);
                }
            }
            BridgeCommand::Metrics { method, reply } => {
                let _ = reply.send(self.metrics.snapshot(method.as_deref()));
            }
            BridgeCommand::Health(reply) => {
                let _ = reply.send(self.health.status().clone());
            }
            BridgeCommand::Phase(reply) => {
                let _ = reply.send(self.phase());
            }
            BridgeCommand::Disconnect(reply) => {
                self.teardown();
                let _ = reply.send(());
            }
        }
    }

    fn phase(&self) -> ConnectionPhase {
        match (self.initialized, self.health.is_connected()) {
            (false, _) => ConnectionPhase::Uninitialized,
            (true, true) => ConnectionPhase::Connected,
            (true, false) => ConnectionPhase::Degraded,
        }
    }

    /// Before the first link exists, and after `disconnect()`, nothing is accepted.
    fn accepting(&self) -> bool {
        self.initialized || self.link.is_some()
    }

    // ============================================
    // DISPATCH
    // ============================================

    fn dispatch(&mut self, request: SendRequest) {
        if !self.accepting() {
            let _ = request
                .reply
                .send(Err(BridgeError::disconnected(request.method)));
            return;
        }

        let operation = PendingOperation::new(request, self.policy.schedule());
        let id = self.pending.insert(operation);
        self.transmit(id);
    }

    /// Send the current attempt of `id` and arm its timeout.
    fn transmit(&mut self, id: CorrelationId) {
        let Some(operation) = self.pending.get_mut(&id) else {
            return;
        };

        let frame = OutgoingFrame {
            correlation_id: id,
            method: operation.method.clone(),
            params: operation.params.clone(),
        };

        if self.debug_frames {
            debug!(
                "-> {} {} (attempt {})",
                frame.correlation_id, frame.method, operation.attempt
            );
        }

        match &self.link {
            Some(link) => {
                if link.outbound.send(frame).is_err() {
                    debug!("Link closed under {}, attempt will time out", id);
                }
            }
            None => debug!("No link for {}, attempt will time out", id),
        }

        let attempt = operation.attempt;
        let deadline = attempt_timeout(operation.base_timeout, attempt);
        operation.arm(schedule(
            &self.commands,
            deadline,
            BridgeCommand::AttemptTimedOut { id, attempt },
        ));
    }

    fn on_attempt_timeout(&mut self, id: CorrelationId, attempt: u32) {
        let Some(operation) = self.pending.get_mut(&id) else {
            return;
        };
        if operation.attempt != attempt {
            return;
        }
        operation.disarm();

        let kind = operation.kind;
        let crossed = kind != SendKind::Handshake && self.health.record_failure();

        if operation.has_retries_left() {
            let delay = operation.schedule.next_delay();
            debug!(
                "{} {} timed out on attempt {}, retrying in {:?}",
                operation.method, id, attempt, delay
            );
            let timer = schedule(
                &self.commands,
                delay,
                BridgeCommand::Retransmit {
                    id,
                    attempt: attempt + 1,
                },
            );
            operation.arm(timer);
        } else if let Some(operation) = self.pending.remove(&id) {
            warn!(
                "{} {} gave up after {} attempts",
                operation.method, id, attempt
            );
            if kind == SendKind::Request {
                self.metrics
                    .record(&operation.method, operation.created_at.elapsed(), false);
            }
            let error = BridgeError::timeout(operation.method.clone(), attempt);
            operation.settle(Err(error));
        }

        if crossed {
            self.on_threshold_crossed();
        }
    }

    fn on_retransmit(&mut self, id: CorrelationId, attempt: u32) {
        let Some(operation) = self.pending.get_mut(&id) else {
            return;
        };
        if operation.attempt + 1 != attempt {
            return;
        }
        operation.disarm();
        operation.attempt = attempt;
        self.transmit(id);
    }

    fn on_response(&mut self, frame: ResponseFrame) {
        let id = frame.correlation_id;
        let Some(operation) = self.pending.remove(&id) else {
            debug!("Discarding response for unknown correlation id {}", id);
            return;
        };

        let latency = operation.created_at.elapsed();
        let kind = operation.kind;
        let attempts = operation.attempt;

        if self.debug_frames {
            debug!("<- {} {} after {:?}", id, operation.method, latency);
        }

        match frame.into_outcome() {
            Ok(value) => {
                if kind != SendKind::Handshake {
                    self.health.record_success();
                }
                if kind == SendKind::Request {
                    self.metrics.record(&operation.method, latency, true);
                }
                operation.settle(Ok(value));
            }
            Err(remote) => {
                if kind != SendKind::Handshake {
                    self.health.record_remote_error();
                }
                if kind == SendKind::Request {
                    self.metrics.record(&operation.method, latency, false);
                }
                let error = BridgeError::remote(operation.method.clone(), remote, attempts);
                operation.settle(Err(error));
            }
        }
    }

    fn on_threshold_crossed(&mut self) {
        warn!(
            "{} consecutive failures, marking bridge disconnected",
            self.health.status().consecutive_failures
        );
        self.recovery.notify_one();
    }

    // ============================================
    // PRIORITY QUEUE
    // ============================================

    fn enqueue(&mut self, priority: i32, request: SendRequest) {
        if !self.accepting() {
            let _ = request
                .reply
                .send(Err(BridgeError::disconnected(request.method)));
            return;
        }

        self.queue.push(priority, request);

        // A running drain picks the new entry up on its next tick.
        if !self.draining {
            self.draining = true;
            self.drain_timer = Some(schedule(
                &self.commands,
                self.drain_delay,
                BridgeCommand::DrainNext,
            ));
        }
    }

    fn drain_next(&mut self) {
        self.drain_timer = None;

        match self.queue.pop() {
            Some((request, waited)) => {
                debug!(
                    "Dequeued {} after {:?} ({} left)",
                    request.method,
                    waited,
                    self.queue.len()
                );
                self.dispatch(request);
                self.drain_timer = Some(schedule(
                    &self.commands,
                    self.drain_delay,
                    BridgeCommand::DrainNext,
                ));
            }
            None => self.draining = false,
        }
    }

    // ============================================
    // LINK
    // ============================================

    fn attach(&mut self, link: TransportLink) {
        self.detach();

        self.generation += 1;
        let generation = self.generation;
        let commands = self.commands.clone();
        let mut inbound = link.inbound;

        let pump = tokio::spawn(async move {
            while let Some(frame) = inbound.recv().await {
                let Some(sender) = commands.upgrade() else {
                    return;
                };
                if sender.send(BridgeCommand::Inbound(frame)).is_err() {
                    return;
                }
            }
            if let Some(sender) = commands.upgrade() {
                let _ = sender.send(BridgeCommand::LinkClosed { generation });
            }
        });

        self.link = Some(ActiveLink {
            outbound: link.outbound,
            generation,
            pump,
        });
        debug!("Link {} attached", generation);
    }

    fn detach(&mut self) {
        if let Some(link) = self.link.take() {
            link.pump.abort();
            debug!("Link {} detached", link.generation);
        }
    }

    fn on_link_closed(&mut self, generation: u64) {
        if self.link.as_ref().map(|link| link.generation) != Some(generation) {
            return;
        }

        self.link = None;
        warn!("Connection to host lost");

        if self.initialized && self.health.mark_link_lost() {
            self.recovery.notify_one();
        }
    }

    /// Back to uninitialized: every caller still waiting gets `Disconnected`.
    fn teardown(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.abort();
        }
        if let Some(timer) = self.drain_timer.take() {
            timer.abort();
        }
        self.draining = false;

        let pending = self.pending.drain();
        let queued = self.queue.drain();
        if !pending.is_empty() || !queued.is_empty() {
            info!(
                "Rejecting {} pending and {} queued requests",
                pending.len(),
                queued.len()
            );
        }

        for operation in pending {
            let error = BridgeError::disconnected(operation.method.clone());
            operation.settle(Err(error));
        }
        for request in queued {
            let _ = request
                .reply
                .send(Err(BridgeError::disconnected(request.method)));
        }

        self.detach();
        self.initialized = false;
        self.health.reset();
    }
}

/// Post `command` back to the actor after `delay`.
fn schedule(
    commands: &WeakUnboundedSender<BridgeCommand>,
    delay: Duration,
    command: BridgeCommand,
) -> JoinHandle<()> {
    let commands = commands.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Some(sender) = commands.upgrade() {
            let _ = sender.send(command);
        }
    })
}
