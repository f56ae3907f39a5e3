//! Shared test infrastructure for the integration suite.

pub mod fixtures;

pub use fixtures::*;
pub use providers::{error_reply, ok_reply, ScriptedAdapter, SlowAdapter};
