//! Repository for the `transfer_events` table.

use depot_core::types::DbId;
use sqlx::PgPool;

use crate::models::transfer_event::TransferEventRow;

const COLUMNS: &str = "id, transfer_id, payload, created_at";

pub struct TransferEventRepo;

impl TransferEventRepo {
    /// Append an event, returning its id. The insert trigger announces it on
    /// the change feed.
    pub async fn insert(
        pool: &PgPool,
        transfer_id: &str,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO transfer_events (transfer_id, payload) \
             VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(transfer_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TransferEventRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transfer_events WHERE id = $1");
        sqlx::query_as::<_, TransferEventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
