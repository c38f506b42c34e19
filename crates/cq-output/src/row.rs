//! Plain data rows written by output backends.

use cq_core::{AgentId, WeatherCondition};

/// One courier's state at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentColumns {
    pub x:          i32,
    pub y:          i32,
    pub stamina:    f64,
    pub reputation: i32,
    pub earned:     f64,
    pub carrying:   usize,
}

/// Summary of one session tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:             u64,
    /// Seconds since the session epoch, at the end of the tick.
    pub elapsed_secs:     f64,
    pub weather:          WeatherCondition,
    pub speed_multiplier: f64,
    pub pool_jobs:        usize,
    pub player:           AgentColumns,
    pub ai:               AgentColumns,
}

/// One score ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEventRow {
    pub tick:   u64,
    pub agent:  AgentId,
    pub kind:   &'static str,
    /// Empty for the end-of-session entry.
    pub job:    String,
    pub points: f64,
}
