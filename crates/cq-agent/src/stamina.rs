//! Stamina bands.
//!
//! | State       | Stamina        | Speed multiplier |
//! |-------------|----------------|------------------|
//! | `Normal`    | > 30           | 1.0              |
//! | `Tired`     | (0, 30]        | 0.8              |
//! | `Exhausted` | ≤ 0            | 0.0              |
//!
//! Hitting zero sets the courier's exhausted lock, which only clears once
//! stamina is back to [`RECOVERY_THRESHOLD`].

use serde::{Deserialize, Serialize};

/// Upper bound of the tired band.
pub const TIRED_THRESHOLD: f64 = 30.0;

/// Stamina needed to lift the exhausted lock.
pub const RECOVERY_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaminaState {
    Normal,
    Tired,
    Exhausted,
}

impl StaminaState {
    pub fn from_stamina(stamina: f64) -> Self {
        if stamina <= 0.0 {
            StaminaState::Exhausted
        } else if stamina <= TIRED_THRESHOLD {
            StaminaState::Tired
        } else {
            StaminaState::Normal
        }
    }

    pub fn speed_multiplier(self) -> f64 {
        match self {
            StaminaState::Normal    => 1.0,
            StaminaState::Tired     => 0.8,
            StaminaState::Exhausted => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StaminaState::Normal    => "normal",
            StaminaState::Tired     => "tired",
            StaminaState::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for StaminaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
