//! Agent-facing handle on the event bus.
//!
//! Agents talk to the rest of the system only through this client: it fixes
//! the sender id on everything they publish and subscribes under that id.

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::event_bus::{BusError, EventBus, EventTypes};
use crate::domain::models::{
    AgentId, AlertKind, AlertSeverity, DataQuery, Event, EventPayload, QueryResult,
};

#[derive(Clone)]
pub struct AgentClient {
    id: AgentId,
    bus: Arc<EventBus>,
}

impl AgentClient {
    pub fn new(id: impl Into<AgentId>, bus: Arc<EventBus>) -> Self {
        Self { id: id.into(), bus }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Publish as this agent. `target` restricts delivery to one subscriber.
    pub fn publish_event(&self, payload: EventPayload, target: Option<AgentId>) -> usize {
        self.bus.publish(payload, self.id.clone(), target)
    }

    pub fn subscribe_to_events<F>(&self, types: impl EventTypes, handler: F)
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.bus.subscribe(types, self.id.clone(), handler);
    }

    /// Subscribe with a handler whose work runs as a spawned task.
    pub fn subscribe_to_events_async<F, Fut>(&self, types: impl EventTypes, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.bus.subscribe_async(types, self.id.clone(), handler);
    }

    pub fn unsubscribe_from_events(&self, types: impl EventTypes) {
        self.bus.unsubscribe(types, self.id.clone());
    }

    pub async fn request_data(&self, query: DataQuery) -> Result<QueryResult, BusError> {
        self.bus.request_data(query, self.id.clone()).await
    }

    pub async fn request_data_with_cancel(
        &self,
        query: DataQuery,
        cancel: CancellationToken,
    ) -> Result<QueryResult, BusError> {
        self.bus
            .request_data_with_cancel(query, self.id.clone(), cancel)
            .await
    }

    pub fn alert_coordinator(
        &self,
        kind: AlertKind,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) -> usize {
        self.bus
            .alert_coordinator(kind, message, severity, self.id.clone())
    }
}
