//! Batch dispatch and per-endpoint outcome classification.

use depot_core::delivery::{DeadReason, DeliveryOutcome};
use depot_core::message::PushMessage;
use depot_core::types::RecipientId;

use super::resolver::ResolvedEndpoint;
use crate::delivery::{PushTransport, TransportError};

/// An endpoint the transport reported as permanently undeliverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadEndpoint {
    pub token: String,
    pub recipient_id: RecipientId,
    pub reason: DeadReason,
}

/// Classified outcomes of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDelivery {
    pub delivered: usize,
    /// Failures that do not warrant cleanup, including unclassified ones.
    pub transient: usize,
    pub dead: Vec<DeadEndpoint>,
}

/// Pair each endpoint with its outcome and sort out the dead ones.
///
/// Outcomes are matched to `batch` by position. If the transport returned
/// too few, the missing tail counts as unclassified failures; extras are
/// ignored.
pub fn classify(batch: &[ResolvedEndpoint], outcomes: Vec<DeliveryOutcome>) -> BatchDelivery {
    if outcomes.len() != batch.len() {
        tracing::warn!(
            expected = batch.len(),
            received = outcomes.len(),
            "Transport returned a mismatched number of outcomes"
        );
    }

    let mut delivery = BatchDelivery::default();
    let mut outcomes = outcomes.into_iter();

    for endpoint in batch {
        match outcomes.next() {
            Some(DeliveryOutcome::Delivered) => delivery.delivered += 1,
            Some(DeliveryOutcome::Dead(reason)) => {
                tracing::debug!(
                    recipient_id = %endpoint.recipient_id,
                    reason = reason.as_str(),
                    "Endpoint is dead"
                );
                delivery.dead.push(DeadEndpoint {
                    token: endpoint.token.clone(),
                    recipient_id: endpoint.recipient_id.clone(),
                    reason,
                });
            }
            Some(DeliveryOutcome::Failed(code)) => {
                tracing::debug!(
                    recipient_id = %endpoint.recipient_id,
                    code = code.as_deref().unwrap_or("unclassified"),
                    "Transient delivery failure"
                );
                delivery.transient += 1;
            }
            None => delivery.transient += 1,
        }
    }
    delivery
}

/// Send one batch through the transport and classify the results.
///
/// The transport is called exactly once. A wholesale failure is returned
/// as-is and never retried here.
pub async fn dispatch_batch(
    transport: &dyn PushTransport,
    batch: &[ResolvedEndpoint],
    message: &PushMessage,
) -> Result<BatchDelivery, TransportError> {
    let tokens: Vec<String> = batch.iter().map(|e| e.token.clone()).collect();
    let outcomes = transport.send_multicast(&tokens, message).await?;
    Ok(classify(batch, outcomes))
}
