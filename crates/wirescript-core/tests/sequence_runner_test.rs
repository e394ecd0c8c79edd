//! Sequence runner integration tests.
//!
//! Each test submits a raw script through the same boundary a transport
//! caller would use, then checks the run result against the recorded
//! notification stream: fail-fast ordering, FIFO expectation matching,
//! lifecycle errors, and the terminal notification contract.

use wirescript_core::{
    Direction, RecordingSink, RunError, RunOutcome, RawEvent, SequenceError, ValidationError,
    run_script,
};
use wirescript_proto::{FieldValue, MessageRegistry};

fn raws(json: serde_json::Value) -> Vec<RawEvent> {
    serde_json::from_value(json).expect("valid raw events")
}

fn run(json: serde_json::Value) -> (Result<wirescript_core::RunResult, SequenceError>, RecordingSink) {
    let registry = MessageRegistry::standard();
    let mut sink = RecordingSink::new();
    let result = run_script(&registry, &raws(json), &mut sink);
    (result, sink)
}

#[test]
fn expect_with_empty_queue_fails() {
    // connect, then expect an init that nobody synthesized
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "expect", "connprivkey": "02", "msg_name": "init"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(result.steps_completed, 1);
    assert_eq!(
        result.outcome,
        RunOutcome::FailureAt {
            step: 1,
            error: RunError::UnmetExpectation { expected: "init".into(), actual: None },
        }
    );

    // The connect notification was still delivered, then the terminal one.
    assert_eq!(sink.steps.len(), 1);
    assert_eq!(sink.steps[0].direction, Direction::Connect);
    assert_eq!(sink.outcome, Some(result.outcome));
}

#[test]
fn liveness_probe_round_trip_succeeds() {
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 10}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(result.outcome, RunOutcome::Success);
    assert_eq!(result.steps_completed, 3);

    assert_eq!(sink.steps.len(), 3);
    assert_eq!(sink.steps[0].direction, Direction::Connect);
    assert_eq!(sink.steps[1].direction, Direction::Out);
    assert_eq!(sink.steps[1].msg_name.as_deref(), Some("ping"));
    assert_eq!(sink.steps[2].direction, Direction::In);
    assert_eq!(sink.steps[2].msg_name.as_deref(), Some("pong"));
    assert_eq!(sink.outcome, Some(RunOutcome::Success));
}

#[test]
fn send_on_unopened_connection_fails_at_step_zero() {
    let (result, sink) = run(serde_json::json!([
        {"type": "send", "connprivkey": "0f", "msg_name": "ping"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(result.steps_completed, 0);
    assert!(matches!(
        result.outcome,
        RunOutcome::FailureAt { step: 0, error: RunError::NotOpen(_) }
    ));
    assert!(sink.steps.is_empty());
}

#[test]
fn double_connect_fails_at_second_step() {
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "connect", "connprivkey": "02"}
    ]));

    let result = result.expect("validation should pass");
    assert!(matches!(
        result.outcome,
        RunOutcome::FailureAt { step: 1, error: RunError::AlreadyOpen(_) }
    ));
    assert_eq!(sink.steps.len(), 1);
}

#[test]
fn full_lifecycle_emits_one_notification_per_step() {
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 4}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"},
        {"type": "disconnect", "connprivkey": "02"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(result.outcome, RunOutcome::Success);
    assert_eq!(sink.steps.len(), 4);

    let directions: Vec<Direction> = sink.steps.iter().map(|n| n.direction).collect();
    assert_eq!(
        directions,
        vec![Direction::Connect, Direction::Out, Direction::In, Direction::Disconnect]
    );
}

#[test]
fn expectations_consume_replies_in_generation_order() {
    // Two probes queue two replies; the expects must see them oldest-first.
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 3}},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 5}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong",
         "fields": {"byteslen": 3}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong",
         "fields": {"byteslen": 5}}
    ]));

    assert_eq!(result.expect("validation should pass").outcome, RunOutcome::Success);
}

#[test]
fn extra_expectation_drains_queue_and_fails() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 1}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(
        result.outcome,
        RunOutcome::FailureAt {
            step: 3,
            error: RunError::UnmetExpectation { expected: "pong".into(), actual: None },
        }
    );
}

#[test]
fn expectation_reports_actual_type_on_mismatch() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 2}},
        {"type": "expect", "connprivkey": "02", "msg_name": "init"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(
        result.outcome,
        RunOutcome::FailureAt {
            step: 2,
            error: RunError::UnmetExpectation {
                expected: "init".into(),
                actual: Some("pong".into()),
            },
        }
    );
}

#[test]
fn field_constraint_violation_is_distinct_from_type_mismatch() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 10}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong",
         "fields": {"byteslen": 4}}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(
        result.outcome,
        RunOutcome::FailureAt {
            step: 2,
            error: RunError::FieldMismatch {
                field: "byteslen".into(),
                expected: FieldValue::Uint(4),
                actual: Some(FieldValue::Uint(10)),
            },
        }
    );
}

#[test]
fn byte_constraints_match_reply_padding() {
    // The synthesized reply pads with zeros, given as hex in the constraint.
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 3}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong",
         "fields": {"byteslen": 3, "ignored": "000000"}}
    ]));

    assert_eq!(result.expect("validation should pass").outcome, RunOutcome::Success);
}

#[test]
fn probe_at_ceiling_leaves_queue_empty() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 65532}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(
        result.outcome,
        RunOutcome::FailureAt {
            step: 2,
            error: RunError::UnmetExpectation { expected: "pong".into(), actual: None },
        }
    );
}

#[test]
fn connections_are_independent() {
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "01"},
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "01", "msg_name": "ping",
         "fields": {"num_pong_bytes": 1}},
        {"type": "expect", "connprivkey": "02", "msg_name": "pong"}
    ]));

    // The reply was queued on connection 01; 02's queue stays empty.
    let result = result.expect("validation should pass");
    assert!(matches!(
        result.outcome,
        RunOutcome::FailureAt { step: 3, error: RunError::UnmetExpectation { .. } }
    ));
    assert_eq!(sink.steps.len(), 3);
}

#[test]
fn multiple_connections_open_and_close() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "01"},
        {"type": "connect", "connprivkey": "02"},
        {"type": "disconnect", "connprivkey": "01"},
        {"type": "disconnect", "connprivkey": "02"}
    ]));

    let result = result.expect("validation should pass");
    assert_eq!(result.outcome, RunOutcome::Success);
    assert_eq!(result.steps_completed, 4);
}

#[test]
fn id_reuse_after_close_is_allowed() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "disconnect", "connprivkey": "02"},
        {"type": "connect", "connprivkey": "02"}
    ]));

    assert_eq!(result.expect("validation should pass").outcome, RunOutcome::Success);
}

#[test]
fn disconnect_without_open_fails() {
    let (result, _sink) = run(serde_json::json!([
        {"type": "disconnect", "connprivkey": "07"}
    ]));

    let result = result.expect("validation should pass");
    assert!(matches!(
        result.outcome,
        RunOutcome::FailureAt { step: 0, error: RunError::NotOpen(_) }
    ));
}

#[test]
fn empty_script_is_rejected_without_notifications() {
    let (result, sink) = run(serde_json::json!([]));

    assert_eq!(result.unwrap_err(), SequenceError::Empty);
    assert!(sink.steps.is_empty());
    assert!(sink.outcome.is_none());
}

#[test]
fn invalid_step_is_rejected_before_any_side_effect() {
    let (result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "invalid_foobar_message"}
    ]));

    assert_eq!(
        result.unwrap_err(),
        SequenceError::Invalid {
            step: 1,
            source: ValidationError::UnknownMessageType("invalid_foobar_message".into()),
        }
    );
    // Run never started: not even the valid first step was executed.
    assert!(sink.steps.is_empty());
    assert!(sink.outcome.is_none());
}

#[test]
fn outbound_notification_carries_wire_payload() {
    let (_result, sink) = run(serde_json::json!([
        {"type": "connect", "connprivkey": "02"},
        {"type": "send", "connprivkey": "02", "msg_name": "ping",
         "fields": {"num_pong_bytes": 1, "byteslen": 0}}
    ]));

    // type code 18, num_pong_bytes 1, byteslen 0, empty tail
    assert_eq!(sink.steps[1].payload.as_deref(), Some("001200010000"));
}
