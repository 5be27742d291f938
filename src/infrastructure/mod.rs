//! Infrastructure layer module
//!
//! Configuration loading and logging setup. Nothing in here is needed to
//! use the coordinator as a library.

pub mod config;
pub mod logging;
