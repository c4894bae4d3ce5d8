//! Firebase Cloud Messaging (HTTP v1) push transport.
//!
//! FCM v1 has no multicast endpoint, so [`FcmTransport`] sends one request
//! per token, at most `max_in_flight` at a time, and reassembles the
//! outcomes in token order. Configuration is loaded from environment
//! variables through [`FcmConfig::from_env`].
//!
//! The OAuth2 access token is taken as given. Minting and refreshing it from
//! a service account is left to the deployment.

use std::time::Duration;

use async_trait::async_trait;
use depot_core::delivery::{DeliveryOutcome, ERROR_INVALID_TOKEN, ERROR_TOKEN_NOT_REGISTERED};
use depot_core::message::PushMessage;
use futures::{stream, StreamExt};
use serde::Deserialize;

use super::{PushTransport, TransportError};

/// Public FCM API host.
const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// HTTP timeout for a single send.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Concurrent sends per batch.
const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Error code reported for sends that never got an HTTP response.
pub const NETWORK_ERROR_CODE: &str = "network";

const FCM_UNREGISTERED: &str = "UNREGISTERED";
const FCM_INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

// ---------------------------------------------------------------------------
// FcmConfig
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FcmConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be a positive integer, got {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    /// OAuth2 bearer token with the `firebase.messaging` scope.
    pub access_token: String,
    /// Base URL, without the `/v1/...` path.
    pub endpoint: String,
    pub request_timeout: Duration,
    pub max_in_flight: usize,
}

impl FcmConfig {
    pub fn new(project_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            access_token: access_token.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable                   | Required | Default                      |
    /// |----------------------------|----------|------------------------------|
    /// | `FCM_PROJECT_ID`           | yes      | —                            |
    /// | `FCM_ACCESS_TOKEN`         | yes      | —                            |
    /// | `FCM_ENDPOINT`             | no       | `https://fcm.googleapis.com` |
    /// | `FCM_REQUEST_TIMEOUT_SECS` | no       | `10`                         |
    /// | `FCM_MAX_IN_FLIGHT`        | no       | `64`                         |
    ///
    /// A numeric variable that is set but not a positive integer is an error.
    pub fn from_env() -> Result<Self, FcmConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FcmConfigError> {
        let project_id =
            lookup("FCM_PROJECT_ID").ok_or(FcmConfigError::Missing("FCM_PROJECT_ID"))?;
        let access_token =
            lookup("FCM_ACCESS_TOKEN").ok_or(FcmConfigError::Missing("FCM_ACCESS_TOKEN"))?;
        let mut config = Self::new(project_id, access_token);

        if let Some(endpoint) = lookup("FCM_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(secs) = positive(&lookup, "FCM_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(n) = positive(&lookup, "FCM_MAX_IN_FLIGHT")? {
            config.max_in_flight = n;
        }
        Ok(config)
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }
}

/// Read an optional positive integer variable.
fn positive<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, FcmConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.parse::<T>() {
        Ok(n) if n > T::default() => Ok(Some(n)),
        _ => Err(FcmConfigError::Invalid { name, value }),
    }
}

// ---------------------------------------------------------------------------
// Error body
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct FcmErrorResponse {
    #[serde(default)]
    error: FcmErrorStatus,
}

#[derive(Debug, Default, Deserialize)]
struct FcmErrorStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct FcmErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
}

/// Map an FCM v1 error response to a delivery outcome.
///
/// `UNREGISTERED` means the token is gone. `INVALID_ARGUMENT` is only a dead
/// token when the message blames the registration token; other invalid
/// arguments are problems with the message itself. Any other code is passed
/// through as-is, and a body without one is reported by HTTP status.
fn classify_error(http_status: u16, body: &str) -> DeliveryOutcome {
    let parsed: FcmErrorResponse = serde_json::from_str(body).unwrap_or_default();
    let blames_token = parsed
        .error
        .message
        .to_ascii_lowercase()
        .contains("registration token");
    let code = parsed
        .error
        .details
        .into_iter()
        .find_map(|d| d.error_code)
        .or_else(|| Some(parsed.error.status).filter(|s| !s.is_empty()));

    let code = match code {
        Some(code) if code == FCM_UNREGISTERED => ERROR_TOKEN_NOT_REGISTERED.to_string(),
        Some(code) if code == FCM_INVALID_ARGUMENT && blames_token => {
            ERROR_INVALID_TOKEN.to_string()
        }
        Some(code) => code,
        None => format!("http-{http_status}"),
    };
    DeliveryOutcome::from_error_code(&code)
}

// ---------------------------------------------------------------------------
// FcmTransport
// ---------------------------------------------------------------------------

/// Result of a single send.
enum SendResult {
    Outcome(DeliveryOutcome),
    /// HTTP 401 or 403: the access token was refused.
    Rejected(u16),
}

pub struct FcmTransport {
    client: reqwest::Client,
    config: FcmConfig,
    send_url: String,
}

impl FcmTransport {
    pub fn new(config: FcmConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let send_url = config.send_url();
        Ok(Self {
            client,
            config,
            send_url,
        })
    }

    async fn send_one(&self, token: &str, message: &PushMessage) -> SendResult {
        let body = serde_json::json!({
            "message": {
                "token": token,
                "notification": message.notification,
                "data": message.data,
            }
        });

        let response = match self
            .client
            .post(&self.send_url)
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "FCM request failed before a response");
                return SendResult::Outcome(DeliveryOutcome::Failed(Some(
                    NETWORK_ERROR_CODE.to_string(),
                )));
            }
        };

        let status = response.status();
        if status.is_success() {
            return SendResult::Outcome(DeliveryOutcome::Delivered);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return SendResult::Rejected(status.as_u16());
        }

        let text = response.text().await.unwrap_or_default();
        SendResult::Outcome(classify_error(status.as_u16(), &text))
    }
}

#[async_trait]
impl PushTransport for FcmTransport {
    /// A batch fails as a whole only when every send had its credentials
    /// rejected. A partial rejection keeps the other outcomes, so dead tokens
    /// answered before the rejection still get pruned; the rejected sends
    /// come back as `Failed(Some("http-<status>"))`.
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<DeliveryOutcome>, TransportError> {
        let sends: Vec<_> = tokens
            .iter()
            .map(|token| self.send_one(token, message))
            .collect();
        let results: Vec<SendResult> = stream::iter(sends)
            .buffered(self.config.max_in_flight.max(1))
            .collect()
            .await;

        let mut rejected = None;
        let mut rejected_count = 0;
        let outcomes: Vec<DeliveryOutcome> = results
            .into_iter()
            .map(|result| match result {
                SendResult::Outcome(outcome) => outcome,
                SendResult::Rejected(status) => {
                    rejected.get_or_insert(status);
                    rejected_count += 1;
                    DeliveryOutcome::Failed(Some(format!("http-{status}")))
                }
            })
            .collect();

        match rejected {
            Some(status) if rejected_count == outcomes.len() => {
                Err(TransportError::Unauthorized { status })
            }
            Some(status) => {
                tracing::warn!(
                    status,
                    rejected = rejected_count,
                    sent = outcomes.len(),
                    "FCM rejected credentials for part of the batch"
                );
                Ok(outcomes)
            }
            None => Ok(outcomes),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
