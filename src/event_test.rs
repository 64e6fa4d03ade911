use super::*;

#[test]
fn insert_event_carries_table_and_op() {
    let user_id = Uuid::new_v4();
    let event = ChangeEvent::insert(user_id, serde_json::json!({"name": "Haircut"}));
    assert_eq!(event.table, SERVICES_TABLE);
    assert_eq!(event.op, ChangeOp::Insert);
    assert_eq!(event.user_id, user_id);
    assert!(event.ts > 0);
}

#[test]
fn delete_event_record_is_id_only() {
    let user_id = Uuid::new_v4();
    let row_id = Uuid::new_v4();
    let event = ChangeEvent::delete(user_id, row_id);
    assert_eq!(event.op, ChangeOp::Delete);
    assert_eq!(event.record, serde_json::json!({ "id": row_id }));
}

#[test]
fn change_event_serde_round_trip() {
    let event = ChangeEvent::new(
        ChangeOp::Update,
        Uuid::new_v4(),
        serde_json::json!({"name": "Massage", "price": 40.0}),
    );
    let json = serde_json::to_string(&event).unwrap();
    let restored: ChangeEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.id, event.id);
    assert_eq!(restored.op, ChangeOp::Update);
    assert_eq!(restored.record, event.record);
}

#[test]
fn change_op_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&ChangeOp::Insert).unwrap(), r#""insert""#);
    assert_eq!(serde_json::to_string(&ChangeOp::Delete).unwrap(), r#""delete""#);
}

#[test]
fn subscribed_message_is_tagged() {
    let msg = ServerMessage::Subscribed { client_id: Uuid::new_v4(), user_id: Uuid::new_v4() };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value.get("kind").and_then(|v| v.as_str()), Some("subscribed"));
    assert!(value.get("client_id").is_some());
}

#[test]
fn change_message_flattens_event_fields() {
    let event = ChangeEvent::insert(Uuid::new_v4(), serde_json::json!({"name": "Trim"}));
    let value = serde_json::to_value(ServerMessage::Change(event)).unwrap();
    assert_eq!(value.get("kind").and_then(|v| v.as_str()), Some("change"));
    assert_eq!(value.get("table").and_then(|v| v.as_str()), Some("services"));
    assert_eq!(value.get("op").and_then(|v| v.as_str()), Some("insert"));
}
