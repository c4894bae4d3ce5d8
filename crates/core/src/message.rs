//! The push message sent for one event.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::audience::Audience;
use crate::event_kind::EventKind;

/// Key of the event kind in the message `data` map.
pub const DATA_KEY_TYPE: &str = "type";

/// Key of the transfer id in the message `data` map.
pub const DATA_KEY_TRANSFER_ID: &str = "transferId";

/// Visible part of a push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationBody {
    pub title: String,
    pub body: String,
}

/// A push message as handed to the transport.
///
/// Serializes to the shape mobile clients consume:
/// `{"notification": {"title", "body"}, "data": {"type", "transferId"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub notification: NotificationBody,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    /// Build the message for an event from its resolved audience.
    pub fn for_event(audience: &Audience, kind: &EventKind, subject_id: &str) -> Self {
        let data = BTreeMap::from([
            (DATA_KEY_TYPE.to_string(), kind.as_str().to_string()),
            (DATA_KEY_TRANSFER_ID.to_string(), subject_id.to_string()),
        ]);
        Self {
            notification: NotificationBody {
                title: audience.title.clone(),
                body: audience.body.clone(),
            },
            data,
        }
    }

    pub fn title(&self) -> &str {
        &self.notification.title
    }

    pub fn body(&self) -> &str {
        &self.notification.body
    }
}
