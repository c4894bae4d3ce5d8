//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the hub between the change feed and the fan-out router.
//! It is designed to be shared via `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use depot_core::event_kind::EventKind;
use depot_core::types::DbId;
use depot_db::models::transfer_event::TransferEventRow;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// TransferEvent
// ---------------------------------------------------------------------------

/// A transfer event as seen by the fan-out engine.
#[derive(Debug, Clone)]
pub struct TransferEvent {
    /// Row id in `transfer_events`, when the event came from the database.
    pub event_id: Option<DbId>,

    pub kind: EventKind,

    /// The transfer this event is about.
    pub subject_id: String,

    /// Raw producer payload.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl TransferEvent {
    pub fn new(kind: EventKind, subject_id: impl Into<String>) -> Self {
        Self {
            event_id: None,
            kind,
            subject_id: subject_id.into(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Interpret a producer payload of the form `{"type", "transferId"}`.
    ///
    /// Both fields are read loosely: a falsy value (missing, `null`, `false`,
    /// `0` or `""`) counts as absent, and any other value is used in its
    /// string form, so `{"type": 17}` is kind `"17"`. An absent `type` yields
    /// `EventKind::Other(None)`; an absent `transferId` falls back to
    /// `fallback_subject`.
    pub fn from_payload(fallback_subject: &str, payload: serde_json::Value) -> Self {
        let kind = EventKind::parse(truthy_string(payload.get("type")).as_deref());
        let subject_id = truthy_string(payload.get("transferId"))
            .unwrap_or_else(|| fallback_subject.to_string());
        Self {
            event_id: None,
            kind,
            subject_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// Build from a persisted row, falling back to the row's `transfer_id`.
    pub fn from_row(row: &TransferEventRow) -> Self {
        let mut event = Self::from_payload(&row.transfer_id, row.payload.clone());
        event.event_id = Some(row.id);
        event.timestamp = row.created_at;
        event
    }
}

/// String form of a payload field, or `None` when the field is falsy.
fn truthy_string(value: Option<&serde_json::Value>) -> Option<String> {
    use serde_json::Value;

    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(display_string(other)),
    }
}

/// Loose string conversion for payload values: integral numbers print
/// without a fraction, arrays join their elements with commas and objects
/// print as `[object Object]`.
fn display_string(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

pub struct EventBus {
    sender: broadcast::Sender<TransferEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it; zero means the
    /// event was dropped.
    pub fn publish(&self, event: TransferEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransferEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
