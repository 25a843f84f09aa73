// tests/event_tests.rs

//! Wire-format tests for the submission types.
//!
//! Covered scenarios:
//! - Batch decode preserves every field of every event, in order
//! - Optional `title` handles absence, an explicit null, and a value
//! - The payload encoding is symmetric with decoding

use serde_json::{Value, json};

use browsetrace::events::{Event, decode_batch, encode_event};

/// Decode a single-event batch and hand back that event.
fn decode_one(body: &str) -> Event {
    let batch = decode_batch(body.as_bytes()).expect("decode failed");
    assert_eq!(batch.events.len(), 1, "expected exactly one event");
    batch.events.into_iter().next().unwrap()
}

#[test]
fn batch_decode_preserves_every_field() {
    let body = json!({
        "events": [{
            "ts_utc": 1_700_000_000_000_i64,
            "ts_iso": "2023-11-14T22:13:20Z",
            "url": "https://example.com/a",
            "title": "Example Domain",
            "type": "navigate",
            "data": { "referrer": "https://example.com" }
        }]
    })
    .to_string();

    let ev = decode_one(&body);
    assert_eq!(ev.ts_utc, 1_700_000_000_000);
    assert_eq!(ev.ts_iso, "2023-11-14T22:13:20Z");
    assert_eq!(ev.url, "https://example.com/a");
    assert_eq!(ev.title.as_deref(), Some("Example Domain"));
    assert_eq!(ev.event_type, "navigate");
    assert_eq!(ev.data.get("referrer"), Some(&json!("https://example.com")));
}

#[test]
fn batch_decode_preserves_order() {
    let body = json!({
        "events": [
            { "ts_utc": 3, "ts_iso": "c", "url": "https://c", "title": null, "type": "focus", "data": {} },
            { "ts_utc": 1, "ts_iso": "a", "url": "https://a", "title": null, "type": "click", "data": {} },
            { "ts_utc": 2, "ts_iso": "b", "url": "https://b", "title": null, "type": "input", "data": {} }
        ]
    })
    .to_string();

    let batch = decode_batch(body.as_bytes()).unwrap();
    let urls: Vec<&str> = batch.events.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(urls, ["https://c", "https://a", "https://b"]);
}

#[test]
fn explicit_null_title_decodes_to_none() {
    let ev = decode_one(
        r#"{"events":[{"ts_utc":1,"ts_iso":"t","url":"https://u","title":null,"type":"click","data":{}}]}"#,
    );
    assert_eq!(ev.title, None);
}

#[test]
fn absent_title_decodes_to_none() {
    let ev = decode_one(
        r#"{"events":[{"ts_utc":1,"ts_iso":"t","url":"https://u","type":"click","data":{}}]}"#,
    );
    assert_eq!(ev.title, None);
}

#[test]
fn encoded_event_spells_null_title_explicitly() {
    let ev = decode_one(
        r#"{"events":[{"ts_utc":5,"ts_iso":"t","url":"https://u","type":"scroll","data":{}}]}"#,
    );

    let bytes = encode_event(&ev).unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["title"], Value::Null);
    assert_eq!(value["type"], "scroll");
    assert_eq!(value["data"], json!({}));
}

#[test]
fn encode_then_decode_is_identity() {
    let original = decode_one(
        r#"{"events":[{"ts_utc":9,"ts_iso":"2024-01-01T00:00:00Z","url":"https://x","title":"X","type":"visible_text","data":{"text":"hello","depth":3}}]}"#,
    );

    let bytes = encode_event(&original).unwrap();
    let body = format!(r#"{{"events":[{}]}}"#, String::from_utf8(bytes).unwrap());
    assert_eq!(decode_one(&body), original);
}
