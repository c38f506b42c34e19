//! The nine discrete weather conditions and their fixed per-condition tables.
//!
//! All variants are always compiled in.  Anything that varies per city (the
//! Markov transition table, the initial condition) comes from the weather
//! config provider and lives in `cq-weather`; the numbers here are the
//! game's constants.

use std::str::FromStr;

use crate::CoreError;

/// A discrete weather state of the city.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WeatherCondition {
    #[default]
    Clear,
    Clouds,
    RainLight,
    Rain,
    Storm,
    Fog,
    Wind,
    Heat,
    Cold,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 9] = [
        WeatherCondition::Clear,
        WeatherCondition::Clouds,
        WeatherCondition::RainLight,
        WeatherCondition::Rain,
        WeatherCondition::Storm,
        WeatherCondition::Fog,
        WeatherCondition::Wind,
        WeatherCondition::Heat,
        WeatherCondition::Cold,
    ];

    /// Steady-state movement speed multiplier.
    pub fn base_speed_multiplier(self) -> f64 {
        match self {
            WeatherCondition::Clear     => 1.00,
            WeatherCondition::Clouds    => 0.98,
            WeatherCondition::RainLight => 0.90,
            WeatherCondition::Rain      => 0.85,
            WeatherCondition::Storm     => 0.75,
            WeatherCondition::Fog       => 0.88,
            WeatherCondition::Wind      => 0.92,
            WeatherCondition::Heat      => 0.90,
            WeatherCondition::Cold      => 0.92,
        }
    }

    /// `[min, max]` intensity drawn when a transition targets this condition.
    pub fn intensity_range(self) -> (f64, f64) {
        match self {
            WeatherCondition::Clear     => (0.0, 0.1),
            WeatherCondition::Clouds    => (0.1, 0.3),
            WeatherCondition::Fog       => (0.3, 0.5),
            WeatherCondition::Wind      => (0.4, 0.7),
            WeatherCondition::RainLight => (0.3, 0.6),
            WeatherCondition::Rain      => (0.6, 0.9),
            WeatherCondition::Storm     => (0.8, 1.0),
            WeatherCondition::Heat      => (0.5, 0.8),
            WeatherCondition::Cold      => (0.4, 0.7),
        }
    }

    /// Extra stamina per cell moved under this condition.
    ///
    /// Clear and cloud-like conditions cost nothing extra; only heavy rain,
    /// wind, heat and storms tax the courier.
    pub fn stamina_surcharge(self) -> f64 {
        match self {
            WeatherCondition::Rain | WeatherCondition::Wind => 0.1,
            WeatherCondition::Heat  => 0.2,
            WeatherCondition::Storm => 0.3,
            WeatherCondition::Clear
            | WeatherCondition::Clouds
            | WeatherCondition::RainLight
            | WeatherCondition::Fog
            | WeatherCondition::Cold => 0.0,
        }
    }

    /// Wire label used by the weather provider.
    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCondition::Clear     => "clear",
            WeatherCondition::Clouds    => "clouds",
            WeatherCondition::RainLight => "rain_light",
            WeatherCondition::Rain      => "rain",
            WeatherCondition::Storm     => "storm",
            WeatherCondition::Fog       => "fog",
            WeatherCondition::Wind      => "wind",
            WeatherCondition::Heat      => "heat",
            WeatherCondition::Cold      => "cold",
        }
    }
}

impl FromStr for WeatherCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeatherCondition::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownCondition(s.to_owned()))
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
