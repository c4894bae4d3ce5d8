//! Change feed over newly inserted transfer events.
//!
//! The `transfer_events` insert trigger issues `pg_notify` with the new row
//! id. [`TransferEventListener`] holds a dedicated LISTEN connection and
//! yields those ids one at a time.
//!
//! `PgListener` reconnects transparently when the connection drops, but
//! notifications sent while it was disconnected are lost. Delivery through
//! this feed is therefore at most once per event.

use depot_core::types::DbId;
use sqlx::postgres::PgListener;

use crate::DbPool;

/// Channel the insert trigger notifies on.
pub const TRANSFER_EVENTS_CHANNEL: &str = "transfer_events";

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A notification arrived whose payload is not a row id.
    #[error("Malformed notification payload: {0:?}")]
    MalformedPayload(String),
}

pub struct TransferEventListener {
    listener: PgListener,
}

impl TransferEventListener {
    /// Open a LISTEN connection from the pool's connect options and
    /// subscribe to [`TRANSFER_EVENTS_CHANNEL`].
    pub async fn connect(pool: &DbPool) -> Result<Self, sqlx::Error> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(TRANSFER_EVENTS_CHANNEL).await?;
        tracing::info!(channel = TRANSFER_EVENTS_CHANNEL, "Listening for transfer events");
        Ok(Self { listener })
    }

    /// Wait for the next inserted event id.
    pub async fn recv(&mut self) -> Result<DbId, ListenerError> {
        let notification = self.listener.recv().await?;
        parse_event_id(notification.payload())
    }
}

fn parse_event_id(payload: &str) -> Result<DbId, ListenerError> {
    payload
        .trim()
        .parse()
        .map_err(|_| ListenerError::MalformedPayload(payload.to_string()))
}
