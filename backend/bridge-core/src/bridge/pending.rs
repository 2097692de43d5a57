//! Outstanding operations keyed by correlation id.

use crate::bridge::command::{Outcome, SendKind, SendRequest};
use crate::bridge::retry::RetrySchedule;

use models::CorrelationId;

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// One request awaiting its response.
#[derive(Debug)]
pub(crate) struct PendingOperation {
    pub method: String,
    pub params: Value,
    pub kind: SendKind,
    /// 1-based number of the transmission currently in flight.
    pub attempt: u32,
    pub max_retries: u32,
    pub base_timeout: Duration,
    pub created_at: Instant,
    pub schedule: RetrySchedule,
    reply: oneshot::Sender<Outcome>,
    timer: Option<JoinHandle<()>>,
}

impl PendingOperation {
    pub fn new(request: SendRequest, schedule: RetrySchedule) -> Self {
        Self {
            method: request.method,
            params: request.params,
            kind: request.kind,
            attempt: 1,
            max_retries: request.max_retries,
            base_timeout: request.timeout,
            created_at: Instant::now(),
            schedule,
            reply: request.reply,
            timer: None,
        }
    }

    pub fn has_retries_left(&self) -> bool {
        self.attempt <= self.max_retries
    }

    /// Replace the armed timer, aborting the previous one.
    pub fn arm(&mut self, timer: JoinHandle<()>) {
        if let Some(previous) = self.timer.replace(timer) {
            previous.abort();
        }
    }

    /// Forget the timer that just fired without aborting it.
    pub fn disarm(&mut self) {
        self.timer = None;
    }

    /// Resolve the caller. A caller that stopped waiting is not an error.
    pub fn settle(mut self, outcome: Outcome) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let _ = self.reply.send(outcome);
    }
}

/// Owned exclusively by the bridge actor.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    operations: HashMap<CorrelationId, PendingOperation>,
}

impl PendingTable {
    /// Store `operation` under an id that is not currently outstanding.
    pub fn insert(&mut self, operation: PendingOperation) -> CorrelationId {
        let mut id = CorrelationId::new();
        while self.operations.contains_key(&id) {
            id = CorrelationId::new();
        }
        self.operations.insert(id, operation);
        id
    }

    pub fn get_mut(&mut self, id: &CorrelationId) -> Option<&mut PendingOperation> {
        self.operations.get_mut(id)
    }

    pub fn remove(&mut self, id: &CorrelationId) -> Option<PendingOperation> {
        self.operations.remove(id)
    }

    pub fn drain(&mut self) -> Vec<PendingOperation> {
        self.operations.drain().map(|(_, operation)| operation).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
