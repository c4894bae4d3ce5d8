//! Per-endpoint delivery outcomes reported by a push transport.
//!
//! Transports translate whatever their provider returns into the closed
//! [`DeliveryOutcome`] union at the boundary, so cleanup decisions never
//! depend on raw provider error strings. The two dead-token codes below are
//! the shared vocabulary: a transport maps its provider's own codes onto
//! them and then classifies through [`DeliveryOutcome::from_error_code`].

/// Error code for a token that is no longer registered.
pub const ERROR_TOKEN_NOT_REGISTERED: &str = "messaging/registration-token-not-registered";

/// Error code for a token that is malformed or otherwise invalid.
pub const ERROR_INVALID_TOKEN: &str = "messaging/invalid-registration-token";

/// Why an endpoint is permanently undeliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadReason {
    NotRegistered,
    InvalidToken,
}

impl DeadReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadReason::NotRegistered => ERROR_TOKEN_NOT_REGISTERED,
            DeadReason::InvalidToken => ERROR_INVALID_TOKEN,
        }
    }
}

/// Result of delivering one message to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The endpoint will never accept a message again and should be pruned.
    Dead(DeadReason),
    /// Any other failure. Holds the error code when one was given; `None`
    /// means no classification is available.
    Failed(Option<String>),
}

impl DeliveryOutcome {
    /// Classify a failed delivery from its error code.
    ///
    /// Only the two dead-token codes cause cleanup.
    pub fn from_error_code(code: &str) -> Self {
        match code {
            ERROR_TOKEN_NOT_REGISTERED => DeliveryOutcome::Dead(DeadReason::NotRegistered),
            ERROR_INVALID_TOKEN => DeliveryOutcome::Dead(DeadReason::InvalidToken),
            other => DeliveryOutcome::Failed(Some(other.to_string())),
        }
    }
}
