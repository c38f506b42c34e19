//! `cq-weather`: the city's stochastic weather process.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`config`]    | `WeatherConfig`, `TransitionTable`, `WeatherTiming`, loaders  |
//! | [`simulator`] | `WeatherSimulator`, `WeatherUpdate`, `WeatherInfo`, `WeatherSnapshot` |
//! | [`burst`]     | `WeatherBurst` display records                                |
//! | [`error`]     | `WeatherError`, `WeatherResult<T>`                            |
//!
//! # Model
//!
//! ```text
//!   Steady(cond) ──burst timer expires──▶ Transitioning(cond → target)
//!        ▲                                        │
//!        └──────── transition timer expires ◀─────┘
//! ```
//!
//! The target is drawn from the current condition's Markov row.  During a
//! transition intensity and speed multiplier move linearly from their values
//! at the start of the transition to the target's.  Both timers are redrawn
//! uniformly from [`WeatherTiming`] each cycle.

pub mod burst;
pub mod config;
pub mod error;
pub mod simulator;


pub use burst::WeatherBurst;
pub use config::{
    InitialWeather, TransitionTable, WeatherConfig, WeatherTiming, load_weather_json,
    load_weather_reader,
};
pub use error::{WeatherError, WeatherResult};
pub use simulator::{WeatherInfo, WeatherSimulator, WeatherSnapshot, WeatherUpdate};
