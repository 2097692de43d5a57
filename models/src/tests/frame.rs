use crate::{CorrelationId, EventFrame, IncomingFrame, OutgoingFrame, RemoteError, ResponseFrame};

use serde_json::{Value, json};

/// **VALUE**: Verifies outgoing frames serialize with the camelCase wire names.
///
/// **WHY THIS MATTERS**: The host matches responses by the `correlationId` member.
/// A snake_case leak (`correlation_id`) would make every request time out.
///
/// **BUG THIS CATCHES**: Would catch a missing `rename_all = "camelCase"`.
#[test]
fn given_outgoing_frame_when_serialized_then_uses_camel_case_members() {
    // GIVEN: An outgoing request frame
    let id = CorrelationId::new();
    let frame = OutgoingFrame {
        correlation_id: id,
        method: String::from("getFields"),
        params: json!({"templateId": 7}),
    };

    // WHEN: Serializing to JSON
    let value = serde_json::to_value(&frame).unwrap();

    // THEN: Members use wire names
    assert_eq!(value["correlationId"], json!(id.to_string()));
    assert_eq!(value["method"], json!("getFields"));
    assert_eq!(value["params"]["templateId"], json!(7));
}

/// **VALUE**: Verifies that responses and pushes are told apart by their members.
///
/// **WHY THIS MATTERS**: Incoming classification is the first step of routing;
/// a push mistaken for a response would be silently dropped, and vice versa.
///
/// **BUG THIS CATCHES**: Would catch reordering of the untagged variants or a
/// required field drifting between the two shapes.
#[test]
fn given_incoming_json_when_decoded_then_classified_by_correlation_id_or_event() {
    // GIVEN: A response and a push in wire form
    let id = CorrelationId::new();
    let response = json!({"correlationId": id.to_string(), "result": {"ok": true}});
    let push = json!({"event": "templateChanged", "payload": {"id": 3}});

    // WHEN: Decoding both
    let response: IncomingFrame = serde_json::from_value(response).unwrap();
    let push: IncomingFrame = serde_json::from_value(push).unwrap();

    // THEN: Each lands in its own variant
    assert_eq!(
        response,
        IncomingFrame::Response(ResponseFrame::success(id, json!({"ok": true})))
    );
    assert_eq!(
        push,
        IncomingFrame::Event(EventFrame {
            event: String::from("templateChanged"),
            payload: json!({"id": 3}),
        })
    );
}

/// **VALUE**: Verifies that a frame with neither `correlationId` nor `event` is rejected.
///
/// **WHY THIS MATTERS**: Such messages must be logged and discarded by the transport,
/// which relies on decoding failing rather than producing a bogus frame.
///
/// **BUG THIS CATCHES**: Would catch an accidental `#[serde(default)]` on the event name.
#[test]
fn given_frame_without_id_or_event_when_decoded_then_fails() {
    // GIVEN: A message matching neither shape
    let junk = json!({"hello": "world"});

    // WHEN: Decoding
    let result = serde_json::from_value::<IncomingFrame>(junk);

    // THEN: Decoding fails
    assert!(result.is_err(), "Unclassifiable frame should not decode");
}

/// **VALUE**: Verifies outcome extraction for error, result and empty responses.
///
/// **WHY THIS MATTERS**: Remote errors must surface immediately and never be
/// confused with a successful `null` result.
///
/// **BUG THIS CATCHES**: Would catch a result winning over an error member, or an
/// empty response being treated as a failure.
#[test]
fn given_response_frames_when_into_outcome_then_error_wins_and_empty_is_null() {
    // GIVEN: Three response shapes
    let id = CorrelationId::new();
    let failed = ResponseFrame {
        correlation_id: id,
        result: Some(json!(1)),
        error: Some(RemoteError::new("template locked")),
    };
    let empty = ResponseFrame {
        correlation_id: id,
        result: None,
        error: None,
    };
    let succeeded = ResponseFrame::success(id, json!([1, 2]));

    // WHEN/THEN: Error member wins, empty resolves to null
    assert_eq!(failed.into_outcome().unwrap_err().message, "template locked");
    assert_eq!(empty.into_outcome().unwrap(), Value::Null);
    assert_eq!(succeeded.into_outcome().unwrap(), json!([1, 2]));
}

/// **VALUE**: Verifies freshly generated correlation ids are distinct.
///
/// **WHY THIS MATTERS**: Exactly one pending operation may exist per id.
///
/// **BUG THIS CATCHES**: Would catch a constant or counter-reset id source.
#[test]
fn given_many_generated_ids_when_compared_then_all_distinct() {
    // GIVEN/WHEN: A thousand ids
    let ids: std::collections::HashSet<CorrelationId> =
        (0..1000).map(|_| CorrelationId::new()).collect();

    // THEN: No collisions
    assert_eq!(ids.len(), 1000);
}
