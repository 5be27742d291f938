//! Common test utilities for integration tests
//!
//! Shared wiring for a bus, task store and coordinator, plus an event
//! recorder used across the integration test files.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use hackathon_coordinator::adapters::memory::InMemoryTaskRepository;
use hackathon_coordinator::domain::models::{
    AgentId, Config, Event, EventType, HackathonPhase, TaskFilter, TaskStatus,
};
use hackathon_coordinator::services::{Coordinator, EventBus, EventBusConfig, TaskService};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A bus, task store and coordinator wired together.
pub struct TestStack {
    pub bus: Arc<EventBus>,
    pub tasks: Arc<TaskService>,
    pub coordinator: Arc<Coordinator>,
}

pub fn test_stack(config: &Config) -> TestStack {
    let bus = Arc::new(EventBus::new(EventBusConfig::from(&config.coordination)));
    let tasks = Arc::new(
        TaskService::new(Arc::new(InMemoryTaskRepository::new()), Arc::clone(&bus))
            .with_strict_transitions(config.coordination.strict_transitions),
    );
    let coordinator = Coordinator::new(Arc::clone(&bus), Arc::clone(&tasks), config);
    TestStack {
        bus,
        tasks,
        coordinator,
    }
}

/// A started coordinator over the default configuration.
pub fn started_stack() -> TestStack {
    let stack = test_stack(&Config::default());
    stack.coordinator.start().expect("coordinator should start");
    stack
}

/// Config with a known participant target.
pub fn config_expecting(participants: u32) -> Config {
    let mut config = Config::default();
    config.event.name = "RustHack".to_string();
    config.event.expected_participants = participants;
    config
}

/// Complete every open, non-follow-up task of `phase`. Returns how many were completed.
pub fn complete_phase(stack: &TestStack, phase: HackathonPhase) -> usize {
    let open: Vec<_> = stack
        .tasks
        .get_tasks(&TaskFilter {
            phase: Some(phase),
            ..Default::default()
        })
        .into_iter()
        .filter(|t| !t.status.is_closed() && !t.is_follow_up())
        .collect();

    for task in &open {
        stack
            .tasks
            .update_task_status(task.id, TaskStatus::Completed, &task.assigned_to, None)
            .expect("completion should succeed");
    }
    open.len()
}

/// Record every event of `types` delivered to `subscriber`.
pub fn record_events(
    bus: &EventBus,
    types: Vec<EventType>,
    subscriber: impl Into<AgentId>,
) -> Arc<Mutex<Vec<Event>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(types, subscriber, move |event: &Event| {
        sink.lock().unwrap().push(event.clone());
        Ok(())
    });
    seen
}
