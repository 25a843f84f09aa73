//! Browser-activity event model and its JSON wire contract.
//!
//! This module defines the `Event` and `Batch` shapes that the ingestion
//! endpoint decodes and the store persists, plus the closed `EventKind` set
//! of recognised event types.
//!
//! ## Wire format
//!
//! A submission body is one JSON object:
//!
//! ```json
//! { "events": [ { "ts_utc": 1234567890, "ts_iso": "2009-02-13T23:31:30Z",
//!                 "url": "https://example.com", "title": null,
//!                 "type": "navigate", "data": {} } ] }
//! ```
//!
//! The field names above are the external contract. They map one-to-one to
//! the struct fields below; the only rename is the wire key `type`, which is
//! a Rust keyword and lives in memory as `event_type`. An absent or `null`
//! `events` list decodes to an empty batch, not an error.
//!
//! Decoding is purely syntactic. Semantic rules (non-empty URL, known type,
//! positive timestamp) belong to the store's validator, so a well-formed
//! document containing nonsense events still decodes successfully here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The closed set of recognised browser event types.
///
/// The set is fixed at compile time; membership is a `match`, not a lookup
/// table. `parse` accepts exactly the wire spellings and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Navigate,
    VisibleText,
    Click,
    Input,
    Scroll,
    Focus,
}

impl EventKind {
    /// Every recognised kind, in schema order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Navigate,
        EventKind::VisibleText,
        EventKind::Click,
        EventKind::Input,
        EventKind::Scroll,
        EventKind::Focus,
    ];

    /// Parse a wire-format type string. Returns `None` for anything outside
    /// the closed set, including the empty string.
    pub fn parse(value: &str) -> Option<EventKind> {
        match value {
            "navigate" => Some(EventKind::Navigate),
            "visible_text" => Some(EventKind::VisibleText),
            "click" => Some(EventKind::Click),
            "input" => Some(EventKind::Input),
            "scroll" => Some(EventKind::Scroll),
            "focus" => Some(EventKind::Focus),
            _ => None,
        }
    }

    /// The wire spelling of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Navigate => "navigate",
            EventKind::VisibleText => "visible_text",
            EventKind::Click => "click",
            EventKind::Input => "input",
            EventKind::Scroll => "scroll",
            EventKind::Focus => "focus",
        }
    }
}

/// One recorded browser action.
///
/// An `Event` is constructed transiently from decoded wire input and either
/// becomes a permanent row or is discarded before any write. Nothing here is
/// validated at decode time; see `EventStore::validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Milliseconds since the Unix epoch. Must be strictly positive to
    /// persist.
    pub ts_utc: i64,
    /// Human-readable timestamp as supplied by the client. Deliberately not
    /// cross-checked against `ts_utc`; the two may disagree.
    pub ts_iso: String,
    /// Subject of the event. Must be non-empty to persist.
    pub url: String,
    /// Page title at event time. Nullable; serialises as an explicit JSON
    /// `null`, never as an empty string.
    pub title: Option<String>,
    /// Wire key `type`. Kept as the raw string so that unknown values reach
    /// the validator (and get reported as such) instead of failing decode.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event-specific payload. Opaque except for being a JSON object; an
    /// absent key decodes to an empty object.
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// An ordered, possibly-empty group of events submitted and persisted
/// together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(default, deserialize_with = "null_to_default")]
    pub events: Vec<Event>,
}

/// Treats an explicit JSON `null` like an absent key.
fn null_to_default<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a submission body into a `Batch`.
///
/// Fails only on syntactically invalid input; semantically invalid events
/// decode fine and are rejected later by the store.
pub fn decode_batch(bytes: &[u8]) -> Result<Batch, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serialise one event back to its wire form.
pub fn encode_event(event: &Event) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(event)
}
