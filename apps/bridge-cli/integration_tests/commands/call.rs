use super::helpers::{call_args, manual_bridge, served_bridge};

use bridge_cli::commands::call;
use bridge_cli::error::CliError;

use bridge_core::ConnectionPhase;
use models::ErrorCode;

/// **VALUE**: Verifies the full `call` path: initialize, request, report, disconnect.
///
/// **WHY THIS MATTERS**: This is what `editor-bridge call getFields` runs; the printed report
/// must carry the result and the bridge's accounting for that one request.
///
/// **BUG THIS CATCHES**: Would catch metrics read before the request settles, or a bridge
/// left connected after the command.
#[tokio::test(start_paused = true)]
async fn given_demo_host_when_calling_get_fields_then_report_has_result_metrics_and_health() {
    // GIVEN: A bridge connected to the demo router
    let bridge = served_bridge();

    // WHEN: Calling getFields
    let report = call(&bridge, &call_args("getFields", None)).await.unwrap();

    // THEN: The result is the field list
    let fields = report.result.as_array().expect("fields array");
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0]["name"], "title");

    // AND: Metrics and health cover exactly this request
    assert_eq!(report.metrics.total_requests, 1);
    assert_eq!(report.metrics.success_count, 1);
    assert_eq!(report.health.total_requests, 1);
    assert_eq!(report.health.success_count, 1);

    // AND: The bridge was disconnected afterwards
    assert_eq!(bridge.phase().await, ConnectionPhase::Uninitialized);
}

/// **VALUE**: Verifies JSON params reach the host handler.
///
/// **WHY THIS MATTERS**: `validate` is only useful if the form values arrive intact.
///
/// **BUG THIS CATCHES**: Would catch params being dropped or sent as a string.
#[tokio::test(start_paused = true)]
async fn given_missing_required_field_when_validating_then_invalid_with_field_error() {
    // GIVEN
    let bridge = served_bridge();

    // WHEN: Validating a form without an assignee
    let report = call(&bridge, &call_args("validate", Some(r#"{"title":"Ship it"}"#)))
        .await
        .unwrap();

    // THEN
    assert_eq!(report.result["valid"], false);
    assert_eq!(report.result["errors"][0]["field"], "assignee");
}

/// **VALUE**: Verifies a prioritized call goes through the queue and still completes.
///
/// **WHY THIS MATTERS**: `--priority` switches the bridge onto the queue path; that path
/// must deliver a result just like a direct request.
///
/// **BUG THIS CATCHES**: Would catch queued entries never draining for a single item.
#[tokio::test(start_paused = true)]
async fn given_priority_and_timeout_when_calling_then_queued_request_completes() {
    // GIVEN
    let bridge = served_bridge();
    let mut args = call_args("echo", Some(r#"{"value":42}"#));
    args.priority = Some(10);
    args.timeout_ms = Some(500);

    // WHEN
    let report = call(&bridge, &args).await.unwrap();

    // THEN
    assert_eq!(report.result["value"], 42);
    assert_eq!(report.metrics.success_count, 1);
}

/// **VALUE**: Verifies handler errors surface with REMOTE_ERROR.
///
/// **WHY THIS MATTERS**: The exit report shows the code; a user needs to see the host's
/// own complaint rather than a connectivity message.
///
/// **BUG THIS CATCHES**: Would catch remote errors being retried into a timeout.
#[tokio::test(start_paused = true)]
async fn given_non_object_params_when_validating_then_remote_error_code() {
    // GIVEN
    let bridge = served_bridge();

    // WHEN
    let error = call(&bridge, &call_args("validate", Some("[1, 2]")))
        .await
        .unwrap_err();

    // THEN
    assert_eq!(error.code(), Some(ErrorCode::RemoteError));
    assert!(error.to_string().contains("object of field values"), "got: {error}");
}

/// **VALUE**: Verifies an unknown method is reported by name.
///
/// **WHY THIS MATTERS**: Typos in the method name are the most common `call` mistake.
///
/// **BUG THIS CATCHES**: Would catch the router swallowing unknown methods.
#[tokio::test(start_paused = true)]
async fn given_unknown_method_when_calling_then_method_not_found() {
    // GIVEN
    let bridge = served_bridge();

    // WHEN
    let error = call(&bridge, &call_args("getFeilds", None)).await.unwrap_err();

    // THEN
    assert_eq!(error.code(), Some(ErrorCode::RemoteError));
    assert!(error.to_string().contains("Method not found: getFeilds"));
}

/// **VALUE**: Verifies an unreachable host fails with HANDSHAKE_FAILED.
///
/// **WHY THIS MATTERS**: Running `call` without a running host is the first thing a new
/// user does; the error must say the connection never came up.
///
/// **BUG THIS CATCHES**: Would catch connect failures mapped to DISCONNECTED or TIMEOUT.
#[tokio::test(start_paused = true)]
async fn given_unreachable_host_when_calling_then_handshake_failed() {
    // GIVEN
    let (bridge, host) = manual_bridge();
    host.set_reachable(false);

    // WHEN
    let error = call(&bridge, &call_args("getFields", None)).await.unwrap_err();

    // THEN
    assert_eq!(error.code(), Some(ErrorCode::HandshakeFailed));
    assert_eq!(host.connect_count(), 1);
}

/// **VALUE**: Verifies argument errors are caught before any connection attempt.
///
/// **WHY THIS MATTERS**: A quoting mistake should not cost a handshake round-trip.
///
/// **BUG THIS CATCHES**: Would catch params parsed after initialize().
#[tokio::test(start_paused = true)]
async fn given_malformed_params_when_calling_then_params_error_without_connecting() {
    // GIVEN
    let (bridge, host) = manual_bridge();

    // WHEN
    let error = call(&bridge, &call_args("echo", Some("{oops"))).await.unwrap_err();

    // THEN
    assert!(matches!(error, CliError::Params { .. }));
    assert_eq!(host.connect_count(), 0);
}
