//! Database change feed → event bus.
//!
//! [`EventFeed`] listens for `transfer_events` inserts, loads each new row
//! and publishes it on the [`EventBus`] as a [`TransferEvent`]. Malformed
//! notifications and rows that disappeared are logged and skipped.

use std::sync::Arc;
use std::time::Duration;

use depot_core::types::DbId;
use depot_db::listener::{ListenerError, TransferEventListener};
use depot_db::repositories::TransferEventRepo;
use depot_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::bus::{EventBus, TransferEvent};

/// Pause after a listener error before trying again.
const RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct EventFeed {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl EventFeed {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Run the feed until `cancel` fires.
    ///
    /// Fails only if the initial LISTEN connection cannot be established.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), sqlx::Error> {
        let mut listener = TransferEventListener::connect(&self.pool).await?;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Event feed cancelled");
                    break;
                }
                received = listener.recv() => match received {
                    Ok(event_id) => self.forward(event_id).await,
                    Err(ListenerError::MalformedPayload(payload)) => {
                        tracing::warn!(
                            payload = %payload,
                            "Ignoring malformed transfer event notification"
                        );
                    }
                    Err(ListenerError::Database(e)) => {
                        tracing::error!(error = %e, "Transfer event listener failed, retrying");
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                },
            }
        }
        Ok(())
    }

    /// Load one event row and publish it.
    async fn forward(&self, event_id: DbId) {
        let row = match TransferEventRepo::find_by_id(&self.pool, event_id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                tracing::warn!(event_id, "Transfer event vanished before it could be loaded");
                return;
            }
            Err(e) => {
                tracing::error!(event_id, error = %e, "Failed to load transfer event");
                return;
            }
        };

        let event = TransferEvent::from_row(&row);
        tracing::debug!(
            event_id,
            event_kind = %event.kind,
            subject_id = %event.subject_id,
            "Publishing transfer event"
        );
        if self.bus.publish(event) == 0 {
            tracing::warn!(event_id, "No subscribers for transfer event");
        }
    }
}
