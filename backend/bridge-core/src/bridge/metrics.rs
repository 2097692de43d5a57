//! Per-method latency/outcome aggregates.

use models::MethodMetrics;

use std::collections::HashMap;
use std::time::Duration;

/// Running aggregates, overall and per method. No samples are retained.
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    overall: MethodMetrics,
    per_method: HashMap<String, MethodMetrics>,
}

impl MetricsCollector {
    pub fn record(&mut self, method: &str, latency: Duration, success: bool) {
        let latency_ms = latency.as_nanos() as f64 / 1_000_000.0;

        fold(&mut self.overall, latency_ms, success);
        fold(
            self.per_method.entry(method.to_string()).or_default(),
            latency_ms,
            success,
        );
    }

    /// Overall aggregate for `None`, zeroed default for a method never seen.
    pub fn snapshot(&self, method: Option<&str>) -> MethodMetrics {
        match method {
            None => self.overall,
            Some(method) => self.per_method.get(method).copied().unwrap_or_default(),
        }
    }
}

fn fold(metrics: &mut MethodMetrics, latency_ms: f64, success: bool) {
    metrics.total_requests += 1;
    if success {
        metrics.success_count += 1;
    }
    metrics.average_latency +=
        (latency_ms - metrics.average_latency) / metrics.total_requests as f64;
}
