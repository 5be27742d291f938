//! CLI command implementations.

pub mod run;
pub mod simulate;

use std::sync::Arc;

use crate::adapters::memory::InMemoryTaskRepository;
use crate::domain::models::Config;
use crate::services::{Coordinator, EventBus, EventBusConfig, TaskService};

/// The in-process services a command runs against.
pub struct CoordinatorStack {
    pub bus: Arc<EventBus>,
    pub tasks: Arc<TaskService>,
    pub coordinator: Arc<Coordinator>,
}

impl CoordinatorStack {
    /// Wire a bus, an in-memory task store and a coordinator from `config`.
    pub fn build(config: &Config) -> Self {
        let bus = Arc::new(EventBus::new(EventBusConfig::from(&config.coordination)));
        let tasks = Arc::new(
            TaskService::new(Arc::new(InMemoryTaskRepository::new()), Arc::clone(&bus))
                .with_strict_transitions(config.coordination.strict_transitions),
        );
        let coordinator = Coordinator::new(Arc::clone(&bus), Arc::clone(&tasks), config);
        Self {
            bus,
            tasks,
            coordinator,
        }
    }
}
