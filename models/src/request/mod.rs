//! Caller-side request descriptions.

pub mod builder;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::time::Duration;

/// Upper bound accepted for any request timeout, per call or configured.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(600);

/// Per-call overrides for a bridge request.
///
/// A `priority` routes the call through the priority queue; without one the
/// request is dispatched immediately. `timeout` replaces the configured base
/// timeout for every attempt of this call. Values above [`MAX_TIMEOUT`] are
/// rejected by the builder and clamped by the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub priority: Option<i32>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn builder() -> builder::RequestOptionsBuilder {
        builder::RequestOptionsBuilder::default()
    }
}

/// One member of a batch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl BatchItem {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}
