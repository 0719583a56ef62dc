use super::*;
use crate::error::ErrorCode;

#[test]
fn ok_envelope_renders_boolean_true() {
    let envelope = Envelope::ok(serde_json::json!({"id": "task_1"}));
    let rendered = envelope.to_json();
    assert_eq!(rendered["ok"], serde_json::json!(true));
    assert_eq!(rendered["data"]["id"], "task_1");
}

#[test]
fn err_envelope_renders_code_and_message() {
    let err = LatticeError::new(ErrorCode::NotFound, "no such task");
    let envelope: Envelope<()> = Envelope::err(&err);
    let rendered = envelope.to_json();
    assert_eq!(rendered["ok"], serde_json::json!(false));
    assert_eq!(rendered["error"]["code"], "NOT_FOUND");
}

#[test]
fn from_result_dispatches_correctly() {
    let ok: Envelope<u32> = Envelope::from_result(Ok(42));
    assert!(matches!(ok, Envelope::Ok { data: 42 }));

    let err: Envelope<u32> = Envelope::from_result(Err(LatticeError::invalid_input("bad")));
    assert!(matches!(err, Envelope::Err { .. }));
}
