//! Push transport port and adapters.

use async_trait::async_trait;
use depot_core::delivery::DeliveryOutcome;
use depot_core::message::PushMessage;

pub mod fcm;

/// Error type for a multicast call that failed as a whole.
///
/// Per-token failures are never reported here; they come back as
/// [`DeliveryOutcome`]s.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client could not be built or the request could not be sent.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider rejected the credentials on every send of the batch.
    #[error("Push provider rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },
}

/// Multicast send primitive.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send `message` to every token in `tokens`.
    ///
    /// Callers pass at most [`BATCH_LIMIT`](depot_core::batching::BATCH_LIMIT)
    /// tokens. On success the result holds one outcome per token, in the same
    /// order as `tokens`.
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<DeliveryOutcome>, TransportError>;
}
