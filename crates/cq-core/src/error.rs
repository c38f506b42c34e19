//! Errors from the `cq-core` parsing helpers.

use thiserror::Error;

/// The base error type for `cq-core` parsing helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown weather condition {0:?}")]
    UnknownCondition(String),

    #[error("invalid direction code {0}")]
    InvalidDirection(u8),
}

/// Shorthand result type for `cq-core`.
pub type CoreResult<T> = Result<T, CoreError>;
