//! Hackathon Coordinator
//!
//! In-process coordination for running a hackathon: a publish/subscribe event
//! bus with request/response correlation, a task store with priority and
//! dependency aware scheduling, and a coordinator that walks the event through
//! its phases.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and errors
//! - **Adapters** (`adapters`): in-memory task storage and mock agents
//! - **Service Layer** (`services`): event bus, task service, coordinator
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hackathon_coordinator::adapters::memory::InMemoryTaskRepository;
//! use hackathon_coordinator::{Config, Coordinator, EventBus, TaskService};
//!
//! let config = Config::default();
//! let bus = Arc::new(EventBus::default());
//! let tasks = Arc::new(TaskService::new(Arc::new(InMemoryTaskRepository::new()), bus.clone()));
//! let coordinator = Coordinator::new(bus, tasks, &config);
//! coordinator.start()?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AgentId, AgentRole, Config, Event, EventPayload, EventType, HackathonPhase, HackathonState,
    Task, TaskPriority, TaskStatus,
};
pub use domain::ports::{Agent, TaskRepository};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AgentClient, BusError, Coordinator, EventBus, TaskService};
