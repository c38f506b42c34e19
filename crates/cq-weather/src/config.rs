//! Weather provider records and cycle timing.
//!
//! The provider document looks like:
//!
//! ```json
//! {
//!   "city": "TigerCity",
//!   "initial": {"condition": "clear", "intensity": 0.0},
//!   "transition": {
//!     "clear":  {"clear": 0.5, "clouds": 0.3, "wind": 0.2},
//!     "clouds": {"clear": 0.4, "clouds": 0.3, "rain_light": 0.3}
//!   }
//! }
//! ```
//!
//! Row order matters: the Markov draw walks each row in document order, so
//! [`TransitionTable`] keeps entries as a `Vec` rather than a map.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cq_core::WeatherCondition;

use crate::{WeatherError, WeatherResult};

// ── TransitionTable ───────────────────────────────────────────────────────────

/// One Markov row: `(next condition, probability)` in provider order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable(pub Vec<(WeatherCondition, f64)>);

impl TransitionTable {
    pub fn new(entries: impl IntoIterator<Item = (WeatherCondition, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Walk the cumulative mass and return the first condition whose running
    /// sum reaches `r`.  If rounding leaves the mass short of `r`, the entry
    /// with the largest probability wins (earliest on ties).  `None` for an
    /// empty row.
    pub fn sample(&self, r: f64) -> Option<WeatherCondition> {
        let mut cumulative = 0.0;
        for &(cond, p) in &self.0 {
            cumulative += p;
            if r <= cumulative {
                return Some(cond);
            }
        }
        self.0
            .iter()
            .fold(None::<(WeatherCondition, f64)>, |best, &(c, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((c, p)),
            })
            .map(|(c, _)| c)
    }

    /// Sum of all probabilities in the row.
    pub fn total_mass(&self) -> f64 {
        self.0.iter().map(|&(_, p)| p).sum()
    }
}

impl Serialize for TransitionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (cond, p) in &self.0 {
            map.serialize_entry(cond, p)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TransitionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = TransitionTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of weather condition to probability")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((cond, p)) = access.next_entry::<WeatherCondition, f64>()? {
                    entries.push((cond, p));
                }
                Ok(TransitionTable(entries))
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

// ── WeatherConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialWeather {
    #[serde(default)]
    pub condition: WeatherCondition,
    #[serde(default)]
    pub intensity: f64,
}

/// What the weather provider supplies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub city:       String,
    #[serde(default)]
    pub initial:    InitialWeather,
    #[serde(default)]
    pub transition: BTreeMap<WeatherCondition, TransitionTable>,
}

impl WeatherConfig {
    /// Markov row for `from`; empty if the provider gave none.
    pub fn row(&self, from: WeatherCondition) -> Option<&TransitionTable> {
        self.transition.get(&from)
    }
}

/// Parse a weather document, stripping any `{"data": ...}` envelopes.
pub fn load_weather_reader<R: Read>(reader: R) -> WeatherResult<WeatherConfig> {
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| WeatherError::Parse(e.to_string()))?;
    let config: WeatherConfig =
        serde_json::from_value(unwrap_envelope(value)).map_err(|e| WeatherError::Parse(e.to_string()))?;
    for (from, row) in &config.transition {
        let mass = row.total_mass();
        if (mass - 1.0).abs() > 1e-6 {
            tracing::warn!(%from, mass, "transition row does not sum to 1");
        }
    }
    Ok(config)
}

fn unwrap_envelope(mut value: serde_json::Value) -> serde_json::Value {
    loop {
        match value {
            serde_json::Value::Object(mut obj) if obj.len() == 1 && obj.contains_key("data") => {
                value = obj.remove("data").unwrap_or_default();
            }
            other => return other,
        }
    }
}

pub fn load_weather_json(path: impl AsRef<Path>) -> WeatherResult<WeatherConfig> {
    let file = std::fs::File::open(path)?;
    load_weather_reader(std::io::BufReader::new(file))
}

// ── WeatherTiming ─────────────────────────────────────────────────────────────

/// Uniform ranges, in seconds, for the two per-cycle timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherTiming {
    pub burst_min_secs:      f64,
    pub burst_max_secs:      f64,
    pub transition_min_secs: f64,
    pub transition_max_secs: f64,
}

impl Default for WeatherTiming {
    fn default() -> Self {
        Self {
            burst_min_secs:      5.0,
            burst_max_secs:      10.0,
            transition_min_secs: 3.0,
            transition_max_secs: 5.0,
        }
    }
}

impl WeatherTiming {
    /// Ranges must be finite, non-negative and ordered.
    pub fn validate(&self) -> WeatherResult<()> {
        for (name, lo, hi) in [
            ("burst", self.burst_min_secs, self.burst_max_secs),
            ("transition", self.transition_min_secs, self.transition_max_secs),
        ] {
            if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi {
                return Err(WeatherError::Timing(format!(
                    "{name} range [{lo}, {hi}] must be finite, non-negative and ordered"
                )));
            }
        }
        Ok(())
    }
}
