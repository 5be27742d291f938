//! Port trait definitions (Hexagonal Architecture)
//!
//! - TaskRepository: storage for task records
//! - Agent: response generation for bus participants

pub mod agent;
pub mod task_repository;

pub use agent::{Agent, AgentResponse, ResponseMetadata};
pub use task_repository::TaskRepository;
