//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - Project and local YAML files under `.hackathon/`
//! - `HACKATHON_*` environment overrides
//! - Validation into [`ConfigError`]

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
