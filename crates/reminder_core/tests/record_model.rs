use chrono::{TimeZone, Utc};
use reminder_core::{ModelValidationError, Note, Reminder};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn note_new_generates_distinct_ids_for_identical_content() {
    let first = Note::new("same text");
    let second = Note::new("same text");

    assert!(!first.id.is_nil());
    assert_ne!(first.id, second.id);
    assert_ne!(first, second);
}

#[test]
fn ids_are_unique_across_many_records() {
    let ids: HashSet<Uuid> = (0..10_000).map(|_| Note::new("n").id).collect();
    assert_eq!(ids.len(), 10_000);
}

#[test]
fn note_equality_and_hash_cover_both_fields() {
    let id = Uuid::new_v4();
    let a = Note::with_id(id, "alpha").unwrap();
    let b = Note::with_id(id, "alpha").unwrap();
    let c = Note::with_id(id, "beta").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<Note> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Note::with_id(Uuid::nil(), "invalid").unwrap_err();
    assert_eq!(err, ModelValidationError::NilId);

    let date = Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 0).unwrap();
    let err = Reminder::with_id(Uuid::nil(), "invalid", date).unwrap_err();
    assert_eq!(err, ModelValidationError::NilId);
}

#[test]
fn reminder_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let date = Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap();
    let reminder = Reminder::with_id(id, "stand-up", date).unwrap();

    let json = serde_json::to_value(&reminder).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "content": "stand-up",
            "date": "2025-03-01T14:37:52Z"
        })
    );

    let decoded: Reminder = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, reminder);
}

#[test]
fn reminder_accepts_offset_dates_and_legacy_numeric_dates() {
    let from_offset: Reminder = serde_json::from_value(serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "content": "offset",
        "date": "2025-03-01T15:37:52+01:00"
    }))
    .unwrap();
    assert_eq!(
        from_offset.date,
        Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap()
    );

    let from_legacy: Reminder = serde_json::from_value(serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "content": "legacy",
        "date": 762_536_272.0
    }))
    .unwrap();
    assert_eq!(
        from_legacy.date,
        Utc.with_ymd_and_hms(2025, 3, 1, 14, 37, 52).unwrap()
    );
}

#[test]
fn deserialize_rejects_nil_id_and_bad_dates() {
    let nil = serde_json::from_value::<Note>(serde_json::json!({
        "id": "00000000-0000-0000-0000-000000000000",
        "content": "x"
    }))
    .unwrap_err();
    assert!(nil.to_string().contains("nil uuid"), "unexpected error: {nil}");

    let bad_date = serde_json::from_value::<Reminder>(serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "content": "x",
        "date": "next tuesday"
    }))
    .unwrap_err();
    assert!(
        bad_date.to_string().contains("invalid reminder date"),
        "unexpected error: {bad_date}"
    );
}
