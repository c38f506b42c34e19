//! `cq-score`: per-agent score bookkeeping.
//!
//! # Crate layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`config`]  | `ScoreConfig` (penalty amounts, time-bonus rate)      |
//! | [`manager`] | `ScoreManager`, `ScoreBreakdown`, `ScoreEvent`, `LatenessTier` |
//! | [`error`]   | `ScoreError`, `ScoreResult<T>`                        |
//!
//! ```text
//! total_points = max(0, base_income + time_bonus − penalty_total)
//! ```
//!
//! Deliveries add income and a lateness penalty, cancellations add a fixed
//! penalty, and [`ScoreManager::finalize`] adds the time bonus exactly once.

pub mod config;
pub mod error;
pub mod manager;


pub use config::ScoreConfig;
pub use error::{ScoreError, ScoreResult};
pub use manager::{LatenessTier, ScoreBreakdown, ScoreEvent, ScoreManager};
