//! Connection health bookkeeping.

use models::HealthStatus;

use std::time::SystemTime;

#[derive(Debug)]
pub(crate) struct HealthTracker {
    status: HealthStatus,
    failure_threshold: u32,
}

impl HealthTracker {
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            status: HealthStatus::default(),
            failure_threshold,
        }
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status.is_connected
    }

    pub fn record_success(&mut self) {
        self.status.total_requests += 1;
        self.status.success_count += 1;
        self.status.consecutive_failures = 0;
        self.status.last_response_time = Some(SystemTime::now());
    }

    /// The host answered, but with an error. Proves liveness without counting as a success.
    pub fn record_remote_error(&mut self) {
        self.status.total_requests += 1;
        self.status.consecutive_failures = 0;
        self.status.last_response_time = Some(SystemTime::now());
    }

    /// Count one failed attempt.
    ///
    /// Returns `true` exactly when this failure takes a connected bridge to the threshold.
    pub fn record_failure(&mut self) -> bool {
        self.status.total_requests += 1;
        self.status.consecutive_failures += 1;

        if self.status.is_connected && self.status.consecutive_failures >= self.failure_threshold {
            self.status.is_connected = false;
            return true;
        }
        false
    }

    /// Successful (re-)initialization.
    pub fn mark_connected(&mut self) {
        self.status.is_connected = true;
        self.status.consecutive_failures = 0;
    }

    /// Link lost underneath a connected bridge. Returns `true` if it was connected.
    pub fn mark_link_lost(&mut self) -> bool {
        std::mem::replace(&mut self.status.is_connected, false)
    }

    /// Back to uninitialized. Counters survive.
    pub fn reset(&mut self) {
        self.status.is_connected = false;
        self.status.consecutive_failures = 0;
    }
}
