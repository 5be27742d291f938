//! In-process event bus with request/response on top.
//!
//! Dispatch is synchronous: `publish` calls each subscriber of the event's
//! type in subscription order before returning. Handlers that need to do
//! async work register through [`EventBus::subscribe_async`]; their futures
//! are spawned on the tokio runtime and never awaited by the bus.
//!
//! Handler failures (errors and panics) are logged and contained per
//! subscriber. The only failure a caller ever sees is from
//! [`EventBus::request_data`], which fails on timeout or cancellation.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::request_tracker::RequestTracker;
use crate::domain::models::{
    AgentId, AlertKind, AlertSeverity, CoordinationConfig, DataQuery, Event, EventPayload,
    EventType, QueryResult, RequestId,
};

/// Alert type published when an async handler fails.
pub const HANDLER_FAILURE_ALERT: &str = "handler_failure";

/// Synchronous event handler.
pub type EventHandler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Errors surfaced to callers of the request/response layer.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Data request {request_id} timed out after {timeout_ms} ms")]
    RequestTimedOut { request_id: RequestId, timeout_ms: u64 },

    #[error("Data request {0} was canceled")]
    RequestCanceled(RequestId),

    #[error("Data request {0} was dropped before a response arrived")]
    ResponderDropped(RequestId),
}

/// One or many event types, so `subscribe` accepts either.
pub trait EventTypes {
    fn into_event_types(self) -> Vec<EventType>;
}

impl EventTypes for EventType {
    fn into_event_types(self) -> Vec<EventType> {
        vec![self]
    }
}

impl EventTypes for Vec<EventType> {
    fn into_event_types(self) -> Vec<EventType> {
        self
    }
}

impl EventTypes for &[EventType] {
    fn into_event_types(self) -> Vec<EventType> {
        self.to_vec()
    }
}

impl<const N: usize> EventTypes for [EventType; N] {
    fn into_event_types(self) -> Vec<EventType> {
        self.to_vec()
    }
}

/// Configuration for the EventBus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// How long `request_data` waits before failing.
    pub request_timeout: Duration,
    /// Interval of the stale-request sweeper.
    pub sweep_interval: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(5_000),
            sweep_interval: Duration::from_millis(60_000),
        }
    }
}

impl From<&CoordinationConfig> for EventBusConfig {
    fn from(config: &CoordinationConfig) -> Self {
        Self {
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            sweep_interval: Duration::from_millis(config.sweep_interval_ms),
        }
    }
}

/// Counters exposed for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    pub published: u64,
    pub deliveries: u64,
    pub handler_failures: u64,
    pub requests_timed_out: u64,
    pub responses_unmatched: u64,
}

#[derive(Debug, Default)]
struct BusCounters {
    published: AtomicU64,
    deliveries: AtomicU64,
    handler_failures: AtomicU64,
    requests_timed_out: AtomicU64,
    responses_unmatched: AtomicU64,
}

impl BusCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BusStats {
        BusStats {
            published: self.published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            requests_timed_out: self.requests_timed_out.load(Ordering::Relaxed),
            responses_unmatched: self.responses_unmatched.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
struct Subscription {
    subscriber: AgentId,
    handler: EventHandler,
}

/// Removes a pending request when the waiting future finishes or is dropped.
struct PendingGuard<'a> {
    tracker: &'a RequestTracker,
    request_id: RequestId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.cancel(self.request_id);
    }
}

/// Central publish/subscribe registry.
pub struct EventBus {
    subscriptions: RwLock<HashMap<EventType, Vec<Subscription>>>,
    requests: RequestTracker,
    counters: BusCounters,
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new EventBus with the given configuration.
    pub fn new(config: EventBusConfig) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            requests: RequestTracker::new(),
            counters: BusCounters::default(),
            config,
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Subscribe `subscriber` to one or more event types.
    ///
    /// Idempotent per `(event type, subscriber)`: a repeat subscription keeps
    /// the original handler and is otherwise ignored.
    pub fn subscribe<F>(&self, types: impl EventTypes, subscriber: impl Into<AgentId>, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_handler(types, subscriber.into(), Arc::new(handler));
    }

    /// Subscribe with an async handler.
    ///
    /// Each delivery spawns the handler's future on the current tokio runtime.
    /// A future that fails is reported by publishing a medium-severity
    /// `handler_failure` alert from the subscriber. Failures while handling
    /// a `handler_failure` alert are only logged, so a subscriber that fails
    /// on every alert cannot feed its own reports back to itself.
    pub fn subscribe_async<F, Fut>(
        self: &Arc<Self>,
        types: impl EventTypes,
        subscriber: impl Into<AgentId>,
        handler: F,
    ) where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let subscriber = subscriber.into();
        let bus = Arc::downgrade(self);
        let owner = subscriber.clone();

        let dispatch: EventHandler = Arc::new(move |event: &Event| {
            let runtime = tokio::runtime::Handle::try_current()
                .map_err(|e| anyhow::anyhow!("no tokio runtime for async handler: {e}"))?;
            let future = handler(event.clone());
            let bus: Weak<Self> = bus.clone();
            let owner = owner.clone();
            let event_type = event.event_type();
            let report = !is_failure_report(event);
            runtime.spawn(async move {
                if let Err(err) = future.await {
                    tracing::warn!(subscriber = %owner, %event_type, error = %err, "async handler failed");
                    if !report {
                        return;
                    }
                    if let Some(bus) = bus.upgrade() {
                        bus.publish(
                            EventPayload::Alert {
                                kind: AlertKind::other(HANDLER_FAILURE_ALERT),
                                message: format!("{owner} failed handling {event_type}: {err}"),
                                severity: AlertSeverity::Medium,
                            },
                            owner,
                            None,
                        );
                    }
                }
            });
            Ok(())
        });

        self.subscribe_handler(types, subscriber, dispatch);
    }

    fn subscribe_handler(&self, types: impl EventTypes, subscriber: AgentId, handler: EventHandler) {
        let mut subscriptions = self.write_subscriptions();
        for event_type in types.into_event_types() {
            let bucket = subscriptions.entry(event_type).or_default();
            if bucket.iter().any(|s| s.subscriber == subscriber) {
                continue;
            }
            tracing::debug!(%subscriber, %event_type, "subscribed");
            bucket.push(Subscription {
                subscriber: subscriber.clone(),
                handler: Arc::clone(&handler),
            });
        }
    }

    /// Remove `subscriber` from the given event types. Empty buckets are dropped.
    pub fn unsubscribe(&self, types: impl EventTypes, subscriber: impl Into<AgentId>) {
        let subscriber = subscriber.into();
        let mut subscriptions = self.write_subscriptions();
        for event_type in types.into_event_types() {
            let now_empty = match subscriptions.get_mut(&event_type) {
                Some(bucket) => {
                    bucket.retain(|s| s.subscriber != subscriber);
                    bucket.is_empty()
                }
                None => false,
            };
            if now_empty {
                subscriptions.remove(&event_type);
            }
        }
    }

    /// Publish a payload. Returns the number of handlers invoked.
    pub fn publish(
        &self,
        payload: EventPayload,
        sender: impl Into<AgentId>,
        target: Option<AgentId>,
    ) -> usize {
        let mut event = Event::new(payload, sender);
        event.target_agent = target;
        self.publish_event(&event)
    }

    /// Dispatch a prepared event to its subscribers.
    pub fn publish_event(&self, event: &Event) -> usize {
        BusCounters::bump(&self.counters.published);
        let event_type = event.event_type();

        // The bus is the first listener for responses, ahead of any target filter
        if let EventPayload::DataResponse { request_id, data } = &event.payload {
            if !self.requests.complete(*request_id, data.clone()) {
                BusCounters::bump(&self.counters.responses_unmatched);
                tracing::debug!(%request_id, "data response matched no pending request");
            }
        }

        // Snapshot so handlers can publish or (un)subscribe without deadlocking
        let recipients: Vec<Subscription> = self
            .read_subscriptions()
            .get(&event_type)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|s| event.is_addressed_to(&s.subscriber))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if recipients.is_empty() {
            tracing::trace!(%event_type, sender = %event.sender, target = ?event.target_agent, "event had no recipients");
        }

        for subscription in &recipients {
            BusCounters::bump(&self.counters.deliveries);
            match catch_unwind(AssertUnwindSafe(|| (subscription.handler)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    BusCounters::bump(&self.counters.handler_failures);
                    tracing::warn!(
                        subscriber = %subscription.subscriber,
                        %event_type,
                        error = %err,
                        "event handler returned an error"
                    );
                }
                Err(_) => {
                    BusCounters::bump(&self.counters.handler_failures);
                    tracing::error!(
                        subscriber = %subscription.subscriber,
                        %event_type,
                        "event handler panicked"
                    );
                }
            }
        }

        recipients.len()
    }

    /// Ask whoever answers data requests for a view of the system state.
    pub async fn request_data(
        &self,
        query: DataQuery,
        requester: impl Into<AgentId>,
    ) -> Result<QueryResult, BusError> {
        self.request_data_with_cancel(query, requester, CancellationToken::new())
            .await
    }

    /// Like [`request_data`](Self::request_data), abandoned early if `cancel` fires.
    pub async fn request_data_with_cancel(
        &self,
        query: DataQuery,
        requester: impl Into<AgentId>,
        cancel: CancellationToken,
    ) -> Result<QueryResult, BusError> {
        let requester = requester.into();
        let request_id = RequestId::new();
        let response = self.requests.track(request_id, requester.clone());
        let _guard = PendingGuard {
            tracker: &self.requests,
            request_id,
        };

        tracing::debug!(%request_id, %requester, query = query.name(), "sending data request");
        self.publish(EventPayload::DataRequest { request_id, query }, requester, None);

        let timeout = self.config.request_timeout;
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        tokio::select! {
            biased;
            result = response => result.map_err(|_| BusError::ResponderDropped(request_id)),
            () = cancel.cancelled() => Err(BusError::RequestCanceled(request_id)),
            () = tokio::time::sleep(timeout) => {
                BusCounters::bump(&self.counters.requests_timed_out);
                tracing::warn!(%request_id, timeout_ms, "data request timed out");
                Err(BusError::RequestTimedOut { request_id, timeout_ms })
            }
        }
    }

    /// Answer a data request, delivering the response only to `target`.
    pub fn respond_to_request(
        &self,
        request_id: RequestId,
        data: QueryResult,
        responder: impl Into<AgentId>,
        target: impl Into<AgentId>,
    ) -> usize {
        self.publish(
            EventPayload::DataResponse { request_id, data },
            responder,
            Some(target.into()),
        )
    }

    /// Raise an alert for the coordinator to act on.
    pub fn alert_coordinator(
        &self,
        kind: AlertKind,
        message: impl Into<String>,
        severity: AlertSeverity,
        sender: impl Into<AgentId>,
    ) -> usize {
        self.publish(
            EventPayload::Alert {
                kind,
                message: message.into(),
                severity,
            },
            sender,
            None,
        )
    }

    /// Drop pending requests older than the request timeout.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.requests.sweep_older_than(self.config.request_timeout);
        if removed > 0 {
            tracing::info!(removed, "swept expired data requests");
        }
        removed
    }

    /// Run [`sweep_expired`](Self::sweep_expired) on the configured interval until `cancel` fires.
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let bus = Arc::clone(self);
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        bus.sweep_expired();
                    }
                }
            }
            tracing::debug!("request sweeper stopped");
        })
    }

    /// Number of subscribers for an event type.
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.read_subscriptions()
            .get(&event_type)
            .map_or(0, Vec::len)
    }

    /// Whether an event type currently has a bucket at all.
    pub fn has_bucket(&self, event_type: EventType) -> bool {
        self.read_subscriptions().contains_key(&event_type)
    }

    pub fn pending_request_count(&self) -> usize {
        self.requests.pending_count()
    }

    pub fn stats(&self) -> BusStats {
        self.counters.snapshot()
    }

    fn read_subscriptions(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<EventType, Vec<Subscription>>> {
        self.subscriptions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_subscriptions(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<EventType, Vec<Subscription>>> {
        self.subscriptions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_failure_report(event: &Event) -> bool {
    matches!(
        &event.payload,
        EventPayload::Alert { kind, .. } if kind.alert_type() == HANDLER_FAILURE_ALERT
    )
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}
