//! Pending-request table for request/response over the event bus.
//!
//! 1. The requester calls [`RequestTracker::track`] and gets a receiver
//! 2. A data-request event goes out carrying the request id
//! 3. The bus sees the matching data-response and calls [`RequestTracker::complete`]
//! 4. The requester's receiver resolves
//!
//! An entry is removed exactly once, by whichever of completion, cancellation
//! or sweep gets to it first. Later attempts are no-ops.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::domain::models::{AgentId, QueryResult, RequestId};

struct PendingRequest {
    requester: AgentId,
    created_at: Instant,
    responder: oneshot::Sender<QueryResult>,
}

/// Tracks outstanding data requests and their response channels.
///
/// Uses a blocking mutex because completion happens inside synchronous
/// event dispatch.
#[derive(Default)]
pub struct RequestTracker {
    pending: Mutex<HashMap<RequestId, PendingRequest>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request and return the receiver its response will arrive on.
    pub fn track(&self, request_id: RequestId, requester: AgentId) -> oneshot::Receiver<QueryResult> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(
            request_id,
            PendingRequest {
                requester,
                created_at: Instant::now(),
                responder: tx,
            },
        );
        rx
    }

    /// Resolve a pending request. Returns `false` if the id is unknown,
    /// already resolved, or the requester has gone away.
    pub fn complete(&self, request_id: RequestId, data: QueryResult) -> bool {
        let Some(entry) = self.lock().remove(&request_id) else {
            return false;
        };
        tracing::debug!(%request_id, requester = %entry.requester, "data request resolved");
        entry.responder.send(data).is_ok()
    }

    /// Drop a pending request without resolving it.
    pub fn cancel(&self, request_id: RequestId) -> bool {
        self.lock().remove(&request_id).is_some()
    }

    /// Remove entries older than `max_age`. Returns how many were removed.
    pub fn sweep_older_than(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|request_id, entry| {
            let keep = now.saturating_duration_since(entry.created_at) <= max_age;
            if !keep {
                tracing::debug!(%request_id, requester = %entry.requester, "sweeping stale data request");
            }
            keep
        });
        before - pending.len()
    }

    pub fn is_pending(&self, request_id: RequestId) -> bool {
        self.lock().contains_key(&request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RequestId, PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
