//! Transfer event model.

use depot_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `transfer_events` table.
///
/// `transfer_id` is the owning transfer; `payload` is whatever the producer
/// wrote, normally `{"type": ..., "transferId": ...}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransferEventRow {
    pub id: DbId,
    pub transfer_id: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
