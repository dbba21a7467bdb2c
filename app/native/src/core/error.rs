//! Unified error types for uiviz.
//!
//! Each module defines its own error type (`PersistenceError`, `LockError`,
//! `EffectError`) which converts into the base [`Error`] type surfaced by the CLI.

use thiserror::Error;

use crate::effect::EffectError;
use crate::state::lock::LockError;
use crate::state::store::PersistenceError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Base error type for all uiviz errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Writing a state file failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Another process owns the lock, or its state is ambiguous.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// The effect controller could not apply or enumerate.
    #[error(transparent)]
    Effect(#[from] EffectError),

    /// Malformed arguments or configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self { Self::Configuration(msg.into()) }
}
