//! Framework error type.
//!
//! Sub-crates define their own error enums (`GridError`, `ScheduleError`,
//! `SimError`) and wrap this one with a `#[from]` conversion.

use thiserror::Error;

/// Errors raised while validating core configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ev-core`.
pub type CoreResult<T> = Result<T, CoreError>;
