//! In-memory fakes for the directory and transport ports.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use depot_core::delivery::DeliveryOutcome;
use depot_core::message::PushMessage;
use depot_core::roles::Role;
use depot_events::directory::{DirectoryError, RecipientDirectory, RecipientEndpoints};
use depot_events::{PushTransport, TransportError};

/// Step log shared between fakes to check the order of calls across ports.
pub type Timeline = Arc<Mutex<Vec<String>>>;

fn record(timeline: &Option<Timeline>, step: String) {
    if let Some(timeline) = timeline {
        timeline.lock().unwrap().push(step);
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredRecipient {
    id: String,
    role: Role,
    is_active: bool,
    tokens: Vec<String>,
}

/// Directory kept in memory, recording every removal write.
#[derive(Default)]
pub struct InMemoryDirectory {
    recipients: Mutex<Vec<StoredRecipient>>,
    deletes: Mutex<Vec<(String, Vec<String>)>>,
    queries: AtomicUsize,
    fail_queries: AtomicBool,
    failing_deletes: Mutex<HashSet<String>>,
    timeline: Mutex<Option<Timeline>>,
    delete_delay: Mutex<Option<Duration>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &str, role: Role, is_active: bool, tokens: &[&str]) -> &Self {
        self.recipients.lock().unwrap().push(StoredRecipient {
            id: id.to_string(),
            role,
            is_active,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes_for(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    /// Log the start and end of every removal write into `timeline`.
    pub fn record_into(&self, timeline: &Timeline) {
        *self.timeline.lock().unwrap() = Some(timeline.clone());
    }

    /// Hold every removal write open for `delay` before applying it.
    pub fn slow_deletes(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    pub fn tokens_of(&self, id: &str) -> Vec<String> {
        self.recipients
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.tokens.clone())
            .unwrap_or_default()
    }

    /// Removal writes in the order they were issued.
    pub fn delete_calls(&self) -> Vec<(String, Vec<String>)> {
        self.deletes.lock().unwrap().clone()
    }

    /// Removal writes sorted by recipient, for order-independent checks.
    pub fn sorted_delete_calls(&self) -> Vec<(String, Vec<String>)> {
        let mut calls = self.delete_calls();
        calls.sort();
        calls
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryDirectory {
    async fn query_active(&self, roles: &[Role]) -> Result<Vec<RecipientEndpoints>, DirectoryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("directory offline".to_string()));
        }
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_active && roles.contains(&r.role))
            .map(|r| RecipientEndpoints {
                id: r.id.clone(),
                role: r.role,
                tokens: r.tokens.clone(),
            })
            .collect())
    }

    async fn delete_endpoints(
        &self,
        recipient_id: &str,
        tokens: &[String],
    ) -> Result<(), DirectoryError> {
        self.deletes
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), tokens.to_vec()));

        let timeline = self.timeline.lock().unwrap().clone();
        record(&timeline, format!("delete-start {recipient_id}"));
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        record(&timeline, format!("delete-done {recipient_id}"));

        if self.failing_deletes.lock().unwrap().contains(recipient_id) {
            return Err(DirectoryError::Unavailable("write rejected".to_string()));
        }

        let mut recipients = self.recipients.lock().unwrap();
        if let Some(recipient) = recipients.iter_mut().find(|r| r.id == recipient_id) {
            recipient.tokens.retain(|t| !tokens.contains(t));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SentBatch {
    pub tokens: Vec<String>,
    pub message: PushMessage,
}

/// Transport that answers from a per-token script. Unscripted tokens are
/// delivered.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<HashMap<String, DeliveryOutcome>>,
    failing_calls: Mutex<HashSet<usize>>,
    calls: Mutex<Vec<SentBatch>>,
    timeline: Mutex<Option<Timeline>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, token: &str, outcome: DeliveryOutcome) -> &Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(token.to_string(), outcome);
        self
    }

    /// Make the `index`-th multicast call (zero-based) fail wholesale.
    pub fn fail_call(&self, index: usize) {
        self.failing_calls.lock().unwrap().insert(index);
    }

    /// Log every multicast call into `timeline`.
    pub fn record_into(&self, timeline: &Timeline) {
        *self.timeline.lock().unwrap() = Some(timeline.clone());
    }

    pub fn calls(&self) -> Vec<SentBatch> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for ScriptedTransport {
    async fn send_multicast(
        &self,
        tokens: &[String],
        message: &PushMessage,
    ) -> Result<Vec<DeliveryOutcome>, TransportError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(SentBatch {
                tokens: tokens.to_vec(),
                message: message.clone(),
            });
            calls.len() - 1
        };
        record(&self.timeline.lock().unwrap().clone(), format!("send {index}"));

        if self.failing_calls.lock().unwrap().contains(&index) {
            return Err(TransportError::Unauthorized { status: 401 });
        }

        let outcomes = self.outcomes.lock().unwrap();
        Ok(tokens
            .iter()
            .map(|t| outcomes.get(t).cloned().unwrap_or(DeliveryOutcome::Delivered))
            .collect())
    }
}
