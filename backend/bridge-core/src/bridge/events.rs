//! Routing of unsolicited host pushes to listeners.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error};
use serde_json::Value;

pub(crate) type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Identifies one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

#[derive(Default)]
pub(crate) struct EventBus {
    listeners: HashMap<String, Vec<(ListenerId, Listener)>>,
}

impl EventBus {
    pub fn subscribe(&mut self, id: ListenerId, event: String, listener: Listener) {
        self.listeners.entry(event).or_default().push((id, listener));
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, listeners| {
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            removed |= listeners.len() != before;
            !listeners.is_empty()
        });
        removed
    }

    /// Invoke every listener for `event` in registration order.
    ///
    /// A panicking listener is logged and does not stop the others.
    /// Returns how many listeners ran.
    pub fn dispatch(&self, event: &str, payload: &Value) -> usize {
        let Some(listeners) = self.listeners.get(event) else {
            debug!("Discarding event {} with no listeners", event);
            return 0;
        };

        for (id, listener) in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(payload))).is_err() {
                error!("Listener {:?} for event {} panicked", id, event);
            }
        }
        listeners.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, listeners)| (event.as_str(), listeners.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}
