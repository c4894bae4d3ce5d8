//! Transfer event kinds emitted by the warehouse change feed.

use std::fmt;

pub const KIND_TRANSFER_CREATED: &str = "transfer_created";
pub const KIND_TRANSFER_PICKED: &str = "transfer_picked";
pub const KIND_TRANSFER_CHECKING: &str = "transfer_checking";
pub const KIND_TRANSFER_DONE: &str = "transfer_done";
pub const KIND_BARCODE_BOUND: &str = "barcode_bound";

/// Kind of a transfer event.
///
/// Parsing never fails: anything not in the known set, including a missing
/// `type`, becomes [`EventKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    TransferCreated,
    TransferPicked,
    TransferChecking,
    TransferDone,
    BarcodeBound,
    /// Unrecognised kind. Holds the string form of the raw value when one
    /// was present.
    Other(Option<String>),
}

impl EventKind {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(KIND_TRANSFER_CREATED) => EventKind::TransferCreated,
            Some(KIND_TRANSFER_PICKED) => EventKind::TransferPicked,
            Some(KIND_TRANSFER_CHECKING) => EventKind::TransferChecking,
            Some(KIND_TRANSFER_DONE) => EventKind::TransferDone,
            Some(KIND_BARCODE_BOUND) => EventKind::BarcodeBound,
            other => EventKind::Other(other.map(str::to_string)),
        }
    }

    /// Wire form used in the notification `data.type` field.
    ///
    /// An absent kind is sent as the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::TransferCreated => KIND_TRANSFER_CREATED,
            EventKind::TransferPicked => KIND_TRANSFER_PICKED,
            EventKind::TransferChecking => KIND_TRANSFER_CHECKING,
            EventKind::TransferDone => KIND_TRANSFER_DONE,
            EventKind::BarcodeBound => KIND_BARCODE_BOUND,
            EventKind::Other(raw) => raw.as_deref().unwrap_or(""),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
