/// Surrogate keys for append-only tables are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Recipients are keyed by an opaque string id owned by the directory.
pub type RecipientId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
