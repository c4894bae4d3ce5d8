//! Per-event dispatch runs.
//!
//! A run resolves the audience for one [`TransferEvent`](crate::TransferEvent),
//! expands it to endpoints, sends them in batches of at most
//! [`BATCH_LIMIT`](depot_core::batching::BATCH_LIMIT), and prunes the tokens
//! the transport reports as dead. Only a directory failure while resolving
//! the audience aborts a run; everything after that is contained per batch
//! or per recipient and ends up in the [`DispatchReport`].

pub mod cleanup;
pub mod dispatcher;
pub mod engine;
pub mod resolver;

pub use cleanup::CleanupFailure;
pub use engine::PushFanout;

use crate::delivery::TransportError;
use crate::directory::DirectoryError;

#[derive(Debug, thiserror::Error)]
pub enum FanoutError {
    /// The directory query failed. Nothing was sent and nothing pruned.
    #[error("Audience resolution failed: {0}")]
    AudienceResolution(#[source] DirectoryError),
}

/// A batch whose multicast call failed as a whole.
#[derive(Debug, thiserror::Error)]
#[error("Batch {index} ({size} endpoints) failed: {error}")]
pub struct BatchFailure {
    /// Zero-based position of the batch within the run.
    pub index: usize,
    pub size: usize,
    #[source]
    pub error: TransportError,
}

/// Summary of one dispatch run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub subject_id: String,
    pub recipients: usize,
    /// Distinct endpoints after deduplication.
    pub endpoints: usize,
    pub batches_sent: usize,
    pub delivered: usize,
    pub transient_failures: usize,
    /// Endpoints the transport classified as dead.
    pub dead_endpoints: usize,
    pub tokens_pruned: usize,
    pub transport_failures: Vec<BatchFailure>,
    pub cleanup_failures: Vec<CleanupFailure>,
}

impl DispatchReport {
    /// `true` when no batch or cleanup write failed.
    pub fn is_clean(&self) -> bool {
        self.transport_failures.is_empty() && self.cleanup_failures.is_empty()
    }
}
