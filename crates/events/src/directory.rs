//! Recipient directory port.
//!
//! The engine reads recipients through [`RecipientDirectory::query_active`]
//! and removes dead tokens through [`RecipientDirectory::delete_endpoints`].
//! It never holds a copy of a recipient across runs.

use async_trait::async_trait;
use depot_core::roles::Role;
use depot_core::types::RecipientId;
use depot_db::repositories::RecipientRepo;
use depot_db::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// A recipient and its endpoint tokens, as read from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEndpoints {
    pub id: RecipientId,
    pub role: Role,
    /// Push tokens in the directory's iteration order.
    pub tokens: Vec<String>,
}

#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// Active recipients whose role is one of `roles`, in a stable order.
    async fn query_active(&self, roles: &[Role]) -> Result<Vec<RecipientEndpoints>, DirectoryError>;

    /// Field-level removal of `tokens` from one recipient's endpoint map.
    ///
    /// Must not replace the map wholesale, and must succeed when a token
    /// (or the recipient) is already gone.
    async fn delete_endpoints(
        &self,
        recipient_id: &str,
        tokens: &[String],
    ) -> Result<(), DirectoryError>;
}

// ---------------------------------------------------------------------------
// PostgreSQL adapter
// ---------------------------------------------------------------------------

/// [`RecipientDirectory`] backed by the `recipients` table.
#[derive(Clone)]
pub struct PgRecipientDirectory {
    pool: DbPool,
}

impl PgRecipientDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn query_active(&self, roles: &[Role]) -> Result<Vec<RecipientEndpoints>, DirectoryError> {
        let rows = RecipientRepo::list_active_by_roles(&self.pool, roles).await?;

        let mut recipients = Vec::with_capacity(rows.len());
        for row in rows {
            let role = match row.role() {
                Ok(role) => role,
                Err(e) => {
                    tracing::warn!(recipient_id = %row.id, error = %e, "Skipping recipient");
                    continue;
                }
            };
            let tokens = row.tokens().map(str::to_string).collect();
            recipients.push(RecipientEndpoints {
                id: row.id,
                role,
                tokens,
            });
        }
        Ok(recipients)
    }

    async fn delete_endpoints(
        &self,
        recipient_id: &str,
        tokens: &[String],
    ) -> Result<(), DirectoryError> {
        let found = RecipientRepo::remove_push_tokens(&self.pool, recipient_id, tokens).await?;
        if !found {
            tracing::debug!(recipient_id, "Recipient gone before cleanup, nothing to remove");
        }
        Ok(())
    }
}
