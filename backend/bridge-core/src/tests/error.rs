// Unit tests for BridgeError classification

use crate::error::bridge::BridgeError;

use models::{ErrorCode, RemoteError};

/// **VALUE**: Verifies each error maps to its wire code.
///
/// **WHY THIS MATTERS**: The UI switches on the code to pick between the host's
/// message and a generic connectivity notice.
#[test]
fn given_each_error_kind_when_code_then_matching_error_code() {
    assert_eq!(BridgeError::timeout("a", 4).code(), ErrorCode::Timeout);
    assert_eq!(BridgeError::disconnected("a").code(), ErrorCode::Disconnected);
    assert_eq!(BridgeError::handshake("no").code(), ErrorCode::HandshakeFailed);
    assert_eq!(
        BridgeError::remote("a", RemoteError::new("boom"), 1).code(),
        ErrorCode::RemoteError
    );
}

/// **VALUE**: Verifies a batch failure reports the failing member's method,
/// code and attempt count.
///
/// **BUG THIS CATCHES**: Would catch a batch error hiding which request failed.
#[test]
fn given_batch_error_when_inspected_then_reports_member_details() {
    // GIVEN: The second batch member timed out after 4 attempts
    let error = BridgeError::batch("getBehaviors", 1, BridgeError::timeout("getBehaviors", 4));

    // THEN: Its details are visible through the batch error
    assert_eq!(error.method(), Some("getBehaviors"));
    assert_eq!(error.code(), ErrorCode::Timeout);
    assert_eq!(error.attempts(), Some(4));
    assert!(error.is_connectivity());
    assert!(error.to_string().contains("item 1 (getBehaviors)"));
}

/// **VALUE**: Verifies remote errors are not classified as connectivity problems
/// and pass the host's message through unchanged.
#[test]
fn given_remote_error_when_inspected_then_message_passed_through() {
    let error = BridgeError::remote(
        "validate",
        RemoteError {
            message: "field 'name' is required".to_string(),
            code: Some(422),
        },
        1,
    );

    assert!(!error.is_connectivity());
    assert!(error.to_string().contains("field 'name' is required"));
    match error {
        BridgeError::Remote { code, attempts, .. } => {
            assert_eq!(code, Some(422));
            assert_eq!(attempts, 1);
        }
        other => panic!("expected remote error, got {other:?}"),
    }
}

/// **VALUE**: Verifies the display carries the capture location.
#[test]
fn given_error_when_displayed_then_includes_location() {
    let error = BridgeError::disconnected("getFields");

    let rendered = error.to_string();

    assert!(rendered.starts_with("Disconnected Error: getFields"));
    assert!(rendered.contains("error.rs:"));
}
