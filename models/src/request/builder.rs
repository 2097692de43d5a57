use crate::error::model_error::ModelError;
use crate::request::MAX_TIMEOUT;
use crate::{ErrorLocation, RequestOptions};

use std::panic::Location;
use std::time::Duration;

/// Builder for validated [`RequestOptions`].
///
/// Both fields are optional; validation only rejects values the dispatcher
/// cannot honour (a zero or absurdly long timeout).
#[derive(Debug, Default)]
pub struct RequestOptionsBuilder {
    priority: Option<i32>,
    timeout: Option<Duration>,
}

impl RequestOptionsBuilder {
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    /// Build the options with validation.
    #[track_caller]
    pub fn build(self) -> Result<RequestOptions, ModelError> {
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(ModelError::Validation {
                    message: String::from("Timeout must be non-zero"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            if timeout > MAX_TIMEOUT {
                return Err(ModelError::Validation {
                    message: format!(
                        "Timeout {}ms exceeds maximum of {}ms",
                        timeout.as_millis(),
                        MAX_TIMEOUT.as_millis()
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }

        Ok(RequestOptions {
            priority: self.priority,
            timeout: self.timeout,
        })
    }
}
