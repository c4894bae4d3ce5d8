//! Repository for the `recipients` table.

use depot_core::roles::Role;
use sqlx::PgPool;

use crate::models::recipient::Recipient;

/// Column list for `recipients` queries.
const COLUMNS: &str = "id, display_name, role, is_active, push_tokens, created_at, updated_at";

/// Read access to recipients and field-level removal of their push tokens.
pub struct RecipientRepo;

impl RecipientRepo {
    /// List active recipients whose role is one of `roles`, ordered by id.
    pub async fn list_active_by_roles(
        pool: &PgPool,
        roles: &[Role],
    ) -> Result<Vec<Recipient>, sqlx::Error> {
        let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM recipients \
             WHERE is_active = true AND role = ANY($1) \
             ORDER BY id"
        );
        sqlx::query_as::<_, Recipient>(&query)
            .bind(role_names)
            .fetch_all(pool)
            .await
    }

    /// Find a recipient by id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Recipient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM recipients WHERE id = $1");
        sqlx::query_as::<_, Recipient>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Remove the given token keys from a recipient's `push_tokens`.
    ///
    /// Only the named keys are deleted; keys added concurrently by other
    /// writers survive. Absent keys and unknown recipients are no-ops.
    /// Returns `true` if the recipient row exists.
    pub async fn remove_push_tokens(
        pool: &PgPool,
        id: &str,
        tokens: &[String],
    ) -> Result<bool, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(false);
        }
        let result = sqlx::query(
            "UPDATE recipients \
             SET push_tokens = push_tokens - $2::text[], updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(tokens)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
