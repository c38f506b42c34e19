//! Session-wide settings.  Every field has a default, so a partial JSON
//! document is a valid config.

use serde::{Deserialize, Serialize};

use cq_agent::CourierConfig;
use cq_ai::{Difficulty, PlannerConfig};
use cq_score::ScoreConfig;
use cq_weather::WeatherTiming;

use crate::{SessionError, SessionResult};

/// The per-tick job-loss trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLossConfig {
    pub enabled:            bool,
    /// Upper bound of the two draws; loss when they match (`1 / (range + 1)`).
    pub range:              u32,
    /// Reputation removed for a lost or cancelled job.
    pub reputation_penalty: i32,
}

impl Default for JobLossConfig {
    fn default() -> Self {
        Self { enabled: true, range: 150, reputation_penalty: 6 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Master RNG seed.  Same seed + same inputs → identical session.
    pub seed:                  u64,
    pub tick_duration_secs:    f64,
    pub session_duration_secs: f64,
    /// Absolute time of tick 0; every job is bound to it.
    pub epoch_secs:            f64,
    pub difficulty:            Difficulty,
    /// Manhattan distance within which pickup and dropoff are allowed.
    pub interaction_radius:    u32,
    /// Stamina regained by an agent that did not move during a tick.
    pub recovery_per_tick:     f64,
    pub job_loss:              JobLossConfig,
    pub courier:               CourierConfig,
    pub score:                 ScoreConfig,
    pub weather:               WeatherTiming,
    pub planner:               PlannerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            tick_duration_secs:    0.1,
            session_duration_secs: 600.0,
            epoch_secs:            0.0,
            difficulty:            Difficulty::default(),
            interaction_radius:    3,
            recovery_per_tick:     0.5,
            job_loss:              JobLossConfig::default(),
            courier:               CourierConfig::default(),
            score:                 ScoreConfig::default(),
            weather:               WeatherTiming::default(),
            planner:               PlannerConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Number of ticks in a full session (rounded up).
    pub fn total_ticks(&self) -> u64 {
        if self.tick_duration_secs <= 0.0 {
            return 0;
        }
        (self.session_duration_secs / self.tick_duration_secs).ceil().max(0.0) as u64
    }

    pub fn validate(&self) -> SessionResult<()> {
        if !(self.tick_duration_secs.is_finite() && self.tick_duration_secs > 0.0) {
            return Err(SessionError::Config(format!(
                "tick_duration_secs must be positive, got {}",
                self.tick_duration_secs
            )));
        }
        if !(self.session_duration_secs.is_finite() && self.session_duration_secs > 0.0) {
            return Err(SessionError::Config(format!(
                "session_duration_secs must be positive, got {}",
                self.session_duration_secs
            )));
        }
        if self.courier.max_weight <= 0.0 || self.courier.stamina_max <= 0.0 {
            return Err(SessionError::Config("courier capacity and stamina must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.planner.reactive_step_probability) {
            return Err(SessionError::Config(format!(
                "reactive_step_probability {} outside [0, 1]",
                self.planner.reactive_step_probability
            )));
        }
        self.weather.validate()?;
        Ok(())
    }
}
