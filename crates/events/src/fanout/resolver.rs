//! Recipient resolution: audience roles to a deduplicated endpoint list.

use std::collections::HashSet;

use depot_core::roles::Role;
use depot_core::types::RecipientId;

use crate::directory::{DirectoryError, RecipientDirectory, RecipientEndpoints};

/// One endpoint and the recipient it is attributed to for cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub token: String,
    pub recipient_id: RecipientId,
}

/// Endpoints for one dispatch run, each token at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    pub endpoints: Vec<ResolvedEndpoint>,
    /// Active recipients the directory returned.
    pub recipient_count: usize,
    /// Tokens dropped because an earlier recipient already claimed them.
    pub duplicates_dropped: usize,
}

impl ResolvedEndpoints {
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }
}

/// Flatten recipients into endpoints, keeping the first owner of each token.
///
/// Order is recipient order, then each recipient's token order. A token
/// registered under two recipients is a data anomaly; the first one seen
/// wins and the later registration is left alone.
pub fn flatten(recipients: &[RecipientEndpoints]) -> ResolvedEndpoints {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut resolved = ResolvedEndpoints {
        recipient_count: recipients.len(),
        ..Default::default()
    };

    for recipient in recipients {
        for token in &recipient.tokens {
            if seen.insert(token.as_str()) {
                resolved.endpoints.push(ResolvedEndpoint {
                    token: token.clone(),
                    recipient_id: recipient.id.clone(),
                });
            } else {
                resolved.duplicates_dropped += 1;
                tracing::debug!(
                    recipient_id = %recipient.id,
                    "Token already claimed by an earlier recipient"
                );
            }
        }
    }
    resolved
}

/// Query the directory for active recipients in `roles` and flatten them.
pub async fn resolve_endpoints(
    directory: &dyn RecipientDirectory,
    roles: &[Role],
) -> Result<ResolvedEndpoints, DirectoryError> {
    let recipients = directory.query_active(roles).await?;
    Ok(flatten(&recipients))
}
