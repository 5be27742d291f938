//! Domain layer for the hackathon coordinator
//!
//! Core models, ports, and errors. Nothing in here knows about tokio,
//! tracing, or configuration files.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
