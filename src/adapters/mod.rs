//! Adapters for the domain ports.

pub mod agents;
pub mod memory;
