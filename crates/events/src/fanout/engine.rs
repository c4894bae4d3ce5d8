//! The fan-out router: one dispatch run per transfer event.

use std::sync::Arc;

use depot_core::audience::resolve_audience;
use depot_core::batching::{chunk, BATCH_LIMIT};
use depot_core::message::PushMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::Instrument;

use super::cleanup::{group_by_recipient, prune};
use super::dispatcher::dispatch_batch;
use super::resolver::resolve_endpoints;
use super::{BatchFailure, DispatchReport, FanoutError};
use crate::bus::TransferEvent;
use crate::delivery::PushTransport;
use crate::directory::RecipientDirectory;

/// Runs the fan-out pipeline for transfer events.
///
/// Holds no per-run state, so concurrent runs for different events share a
/// single instance through `Arc<PushFanout>`.
pub struct PushFanout {
    directory: Arc<dyn RecipientDirectory>,
    transport: Arc<dyn PushTransport>,
}

impl PushFanout {
    pub fn new(directory: Arc<dyn RecipientDirectory>, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            directory,
            transport,
        }
    }

    /// Execute one dispatch run for `event`.
    ///
    /// Batches go out one after another. The dead tokens of a batch are
    /// pruned, with all of that batch's writes awaited, before the next
    /// batch is sent.
    pub async fn dispatch(&self, event: &TransferEvent) -> Result<DispatchReport, FanoutError> {
        let audience = resolve_audience(&event.kind, &event.subject_id);
        let mut report = DispatchReport {
            subject_id: event.subject_id.clone(),
            ..Default::default()
        };

        let resolved = resolve_endpoints(self.directory.as_ref(), &audience.roles)
            .await
            .map_err(FanoutError::AudienceResolution)?;
        report.recipients = resolved.recipient_count;
        report.endpoints = resolved.len();

        if resolved.is_empty() {
            tracing::debug!(recipients = resolved.recipient_count, "No endpoints to notify");
            return Ok(report);
        }
        if resolved.duplicates_dropped > 0 {
            tracing::warn!(
                duplicates = resolved.duplicates_dropped,
                "Push tokens registered under more than one recipient"
            );
        }

        let message = PushMessage::for_event(&audience, &event.kind, &event.subject_id);

        for (index, batch) in chunk(&resolved.endpoints, BATCH_LIMIT).into_iter().enumerate() {
            let delivery = match dispatch_batch(self.transport.as_ref(), batch, &message).await {
                Ok(delivery) => delivery,
                Err(error) => {
                    let failure = BatchFailure {
                        index,
                        size: batch.len(),
                        error,
                    };
                    tracing::error!(error = %failure, "Multicast send failed");
                    report.transport_failures.push(failure);
                    continue;
                }
            };

            report.batches_sent += 1;
            report.delivered += delivery.delivered;
            report.transient_failures += delivery.transient;
            report.dead_endpoints += delivery.dead.len();

            if delivery.dead.is_empty() {
                continue;
            }
            let summary = prune(self.directory.as_ref(), group_by_recipient(&delivery.dead)).await;
            report.tokens_pruned += summary.tokens_removed;
            report.cleanup_failures.extend(summary.failures);
        }

        Ok(report)
    }

    /// Run the routing loop.
    ///
    /// Every received event is dispatched on its own task. The loop exits
    /// when `cancel` fires or the bus is dropped, then waits for in-flight
    /// runs to finish.
    pub async fn run(
        self: Arc<Self>,
        mut receiver: broadcast::Receiver<TransferEvent>,
        cancel: CancellationToken,
    ) {
        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Push fan-out cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => {
                        let fanout = Arc::clone(&self);
                        let span = tracing::info_span!(
                            "dispatch",
                            event_id = ?event.event_id,
                            event_kind = %event.kind,
                            subject_id = %event.subject_id,
                        );
                        tracker.spawn(async move { fanout.handle(event).await }.instrument(span));
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Push fan-out lagged, events were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, push fan-out shutting down");
                        break;
                    }
                },
            }
        }

        tracker.close();
        if !tracker.is_empty() {
            tracing::info!(in_flight = tracker.len(), "Waiting for dispatch runs to finish");
        }
        tracker.wait().await;
    }

    async fn handle(&self, event: TransferEvent) {
        match self.dispatch(&event).await {
            Ok(report) if report.is_clean() => {
                tracing::info!(
                    endpoints = report.endpoints,
                    delivered = report.delivered,
                    pruned = report.tokens_pruned,
                    "Dispatch run complete"
                );
            }
            Ok(report) => {
                tracing::warn!(
                    endpoints = report.endpoints,
                    delivered = report.delivered,
                    pruned = report.tokens_pruned,
                    failed_batches = report.transport_failures.len(),
                    failed_cleanups = report.cleanup_failures.len(),
                    "Dispatch run completed with failures"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Dispatch run aborted");
            }
        }
    }
}
