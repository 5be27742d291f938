//! Agent adapters.

pub mod mock;

pub use mock::{MockAgent, MockReply};
