//! Recipient entity model.

use std::collections::BTreeMap;

use depot_core::error::CoreError;
use depot_core::roles::Role;
use depot_core::types::{RecipientId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `recipients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    /// Device token -> opaque registration metadata.
    pub push_tokens: Json<BTreeMap<String, serde_json::Value>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Recipient {
    /// Parsed role. Fails only if the row bypassed the check constraint.
    pub fn role(&self) -> Result<Role, CoreError> {
        self.role.parse()
    }

    /// Registered push tokens in key order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.push_tokens.0.keys().map(String::as_str)
    }
}
