//! Dead endpoint cleanup.
//!
//! Dead tokens are grouped by their owning recipient and removed with one
//! field-level write per recipient. Writes for a batch run concurrently and
//! are all awaited; a failed write is collected, never short-circuits its
//! siblings, and is not retried.

use std::collections::BTreeMap;

use depot_core::types::RecipientId;
use futures::future::join_all;

use super::dispatcher::DeadEndpoint;
use crate::directory::{DirectoryError, RecipientDirectory};

/// A recipient whose dead tokens could not be removed this run.
#[derive(Debug, thiserror::Error)]
#[error("Failed to prune {} token(s) from recipient {recipient_id}: {error}", .tokens.len())]
pub struct CleanupFailure {
    pub recipient_id: RecipientId,
    pub tokens: Vec<String>,
    #[source]
    pub error: DirectoryError,
}

/// Result of pruning one batch's dead endpoints.
#[derive(Debug, Default)]
pub struct PruneSummary {
    /// Recipients whose removal write succeeded.
    pub recipients_updated: usize,
    /// Tokens covered by successful writes.
    pub tokens_removed: usize,
    pub failures: Vec<CleanupFailure>,
}

/// Group dead endpoints by owning recipient, keeping first-seen token order
/// and dropping repeats.
pub fn group_by_recipient(dead: &[DeadEndpoint]) -> BTreeMap<RecipientId, Vec<String>> {
    let mut grouped: BTreeMap<RecipientId, Vec<String>> = BTreeMap::new();
    for endpoint in dead {
        let tokens = grouped.entry(endpoint.recipient_id.clone()).or_default();
        if !tokens.contains(&endpoint.token) {
            tokens.push(endpoint.token.clone());
        }
    }
    grouped
}

/// Remove dead tokens, one concurrent write per recipient.
pub async fn prune(
    directory: &dyn RecipientDirectory,
    dead_by_recipient: BTreeMap<RecipientId, Vec<String>>,
) -> PruneSummary {
    let writes = dead_by_recipient
        .into_iter()
        .filter(|(_, tokens)| !tokens.is_empty())
        .map(|(recipient_id, tokens)| async move {
            let result = directory.delete_endpoints(&recipient_id, &tokens).await;
            (recipient_id, tokens, result)
        });

    let mut summary = PruneSummary::default();
    for (recipient_id, tokens, result) in join_all(writes).await {
        match result {
            Ok(()) => {
                tracing::info!(
                    recipient_id = %recipient_id,
                    count = tokens.len(),
                    "Pruned dead push tokens"
                );
                summary.recipients_updated += 1;
                summary.tokens_removed += tokens.len();
            }
            Err(error) => {
                let failure = CleanupFailure {
                    recipient_id,
                    tokens,
                    error,
                };
                tracing::warn!(error = %failure, "Push token cleanup failed");
                summary.failures.push(failure);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use depot_core::delivery::DeadReason;

    use super::*;

    fn dead(token: &str, recipient: &str) -> DeadEndpoint {
        DeadEndpoint {
            token: token.to_string(),
            recipient_id: recipient.to_string(),
            reason: DeadReason::NotRegistered,
        }
    }

    #[test]
    fn groups_tokens_per_recipient() {
        let grouped = group_by_recipient(&[
            dead("a", "u2"),
            dead("b", "u1"),
            dead("c", "u2"),
            dead("a", "u2"),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["u1"], vec!["b"]);
        assert_eq!(grouped["u2"], vec!["a", "c"]);
    }

    #[test]
    fn no_dead_endpoints_means_no_groups() {
        assert!(group_by_recipient(&[]).is_empty());
    }

    #[test]
    fn failure_message_names_recipient() {
        let failure = CleanupFailure {
            recipient_id: "u9".to_string(),
            tokens: vec!["a".to_string(), "b".to_string()],
            error: DirectoryError::Unavailable("connection reset".to_string()),
        };
        let msg = failure.to_string();
        assert!(msg.contains("2 token(s)"));
        assert!(msg.contains("u9"));
        assert!(msg.contains("connection reset"));
    }
}
