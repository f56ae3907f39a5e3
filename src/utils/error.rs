//! Crate-wide error taxonomy.
//!
//! Per the core's propagation policy, almost nothing escapes as an `Err`:
//! provider faults are absorbed into [`crate::core::types::ConsensusSignal`]
//! and request-time validation faults are materialized as a non-tradable
//! signal rather than raised. The only faults that surface through
//! [`CoreError`] are configuration faults at load time and programmer
//! errors.

use thiserror::Error;

/// Result alias for fallible operations at the crate boundary.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can escape the core.
///
/// Everything here is either a load-time configuration fault or an I/O
/// failure while reading that configuration; request-time faults never
/// reach this type (see [`crate::core::types::ConsensusSignal::reject_reason`]).
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration failed validation or could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Configuration file could not be read.
    #[error("io error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration document could not be deserialized.
    #[error("configuration deserialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// The `config` crate failed to layer sources.
    #[error("configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

impl CoreError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        CoreError::Configuration(msg.into())
    }
}
