//! Map-subsystem error type.

use thiserror::Error;

use cq_core::GridPos;

/// Errors produced by `cq-map`.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("no path from {from} to {to}")]
    NoPath { from: GridPos, to: GridPos },

    #[error("search from {from} to {to} gave up after expanding {expanded} cells")]
    BudgetExhausted {
        from:     GridPos,
        to:       GridPos,
        expanded: usize,
    },

    #[error("map is {width}x{height} but {what} has {got} entries")]
    Dimensions {
        width:  u32,
        height: u32,
        what:   &'static str,
        got:    usize,
    },

    #[error("map parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;
