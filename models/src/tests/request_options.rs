use crate::{ModelError, RequestOptions};

use std::time::Duration;

/// **VALUE**: Verifies that a zero timeout is rejected.
///
/// **WHY THIS MATTERS**: A zero base timeout would make every attempt expire
/// instantly and burn through the retry budget without waiting for the host.
///
/// **BUG THIS CATCHES**: Would catch removal of the zero check in `build()`.
#[test]
fn given_zero_timeout_when_building_options_then_returns_validation_error() {
    // GIVEN: Builder with a zero timeout
    let builder = RequestOptions::builder().with_timeout(Duration::ZERO);

    // WHEN: Building
    let result = builder.build();

    // THEN: Validation error
    match result.unwrap_err() {
        ModelError::Validation { message, .. } => {
            assert_eq!(message, "Timeout must be non-zero");
        }
    }
}

/// **VALUE**: Verifies that an oversized timeout is rejected.
///
/// **WHY THIS MATTERS**: Attempt timeouts are scaled up on each retry; an unbounded
/// base would leave callers suspended for hours.
///
/// **BUG THIS CATCHES**: Would catch removal of the upper bound.
#[test]
fn given_huge_timeout_when_building_options_then_returns_validation_error() {
    // GIVEN: Builder with a one-hour timeout
    let builder = RequestOptions::builder().with_timeout(Duration::from_secs(3600));

    // WHEN/THEN: Building fails
    assert!(builder.build().is_err());
}

/// **VALUE**: Verifies that priority and timeout flow into the built options.
///
/// **WHY THIS MATTERS**: The priority decides whether a call is queued or sent
/// immediately, so losing it changes dispatch order.
///
/// **BUG THIS CATCHES**: Would catch a builder that drops one of its fields.
#[test]
fn given_priority_and_timeout_when_building_then_both_are_set() {
    // GIVEN/WHEN: Building with both fields
    let options = RequestOptions::builder()
        .with_priority(10)
        .with_timeout_ms(250)
        .build()
        .unwrap();

    // THEN: Both set
    assert_eq!(options.priority, Some(10));
    assert_eq!(options.timeout, Some(Duration::from_millis(250)));
}

/// **VALUE**: Verifies that default options carry no overrides.
///
/// **WHY THIS MATTERS**: `RequestOptions::default()` is the immediate-dispatch path.
///
/// **BUG THIS CATCHES**: Would catch a default priority sneaking in.
#[test]
fn given_default_options_when_inspected_then_no_priority_or_timeout() {
    let options = RequestOptions::default();

    assert_eq!(options.priority, None);
    assert_eq!(options.timeout, None);
}
