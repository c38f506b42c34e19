use serde::{Deserialize, Serialize};

/// Penalty amounts and the time-bonus rate, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub cancellation_penalty: f64,
    /// Late by at most 30 s.
    pub minor_late_penalty:    f64,
    /// Late by at most 120 s.
    pub moderate_late_penalty: f64,
    pub severe_late_penalty:   f64,
    /// Points per second left on the clock at finalization.
    pub time_bonus_rate:       f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            cancellation_penalty:  75.0,
            minor_late_penalty:    10.0,
            moderate_late_penalty: 25.0,
            severe_late_penalty:   50.0,
            time_bonus_rate:       0.2,
        }
    }
}
