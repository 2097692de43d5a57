use serde::{Deserialize, Serialize};

use std::time::SystemTime;

/// Snapshot of the bridge's connection health.
///
/// Updated by every completed request attempt and every health probe.
/// `is_connected` only becomes `true` through a successful (re-)initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_connected: bool,
    pub last_response_time: Option<SystemTime>,
    pub consecutive_failures: u32,
    pub total_requests: u64,
    pub success_count: u64,
}

impl HealthStatus {
    /// Fraction of completed attempts that succeeded, `1.0` before any traffic.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            self.success_count as f64 / self.total_requests as f64
        }
    }
}
