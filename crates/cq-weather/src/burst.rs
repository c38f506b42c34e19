//! Weather burst display records.

use serde::{Deserialize, Serialize};

use cq_core::WeatherCondition;

use crate::WeatherSimulator;

/// One hour of a weather forecast strip.  Providers may omit any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherBurst {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour:      Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<WeatherCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city:      Option<String>,
}

impl WeatherSimulator {
    /// `hours` burst records, one per hour from 0, all showing the current
    /// weather.
    pub fn bursts(&self, hours: u32) -> Vec<WeatherBurst> {
        let city = (!self.config().city.is_empty()).then(|| self.config().city.clone());
        (0..hours)
            .map(|hour| WeatherBurst {
                hour:      Some(hour),
                condition: Some(self.condition()),
                intensity: Some(self.intensity()),
                city:      city.clone(),
            })
            .collect()
    }
}
