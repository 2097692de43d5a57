use serde::{Deserialize, Serialize};

/// Latency/outcome aggregate for one method, or for all methods combined.
///
/// Only running totals are kept, so memory stays constant regardless of volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetrics {
    pub total_requests: u64,
    pub success_count: u64,
    /// Mean latency in milliseconds.
    pub average_latency: f64,
}

impl MethodMetrics {
    pub fn failure_count(&self) -> u64 {
        self.total_requests - self.success_count
    }
}
