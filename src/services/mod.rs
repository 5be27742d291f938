//! Application services: the event bus, the task store and the coordinator.

pub mod agent_client;
pub mod coordinator;
pub mod event_bus;
pub mod request_tracker;
pub mod task_service;

pub use agent_client::AgentClient;
pub use coordinator::{Coordinator, CycleReport};
pub use event_bus::{
    BusError, BusStats, EventBus, EventBusConfig, EventHandler, EventTypes, HANDLER_FAILURE_ALERT,
};
pub use request_tracker::RequestTracker;
pub use task_service::TaskService;
