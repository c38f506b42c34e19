//! `cq-agent`: the courier state machine shared by the player and the AI.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`config`]   | `CourierConfig` (capacity, stamina and cost constants)    |
//! | [`stamina`]  | `StaminaState` and its thresholds                         |
//! | [`courier`]  | `Courier`, `DeliveryOutcome`, `DefeatReason`              |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                            |
//!
//! # Tick contract
//!
//! The session drives a courier in this order each tick:
//!
//! ```text
//! set_weather(condition)            → weather surcharge for this tick
//! move_dir / move_to                → validated against GridMap, costs stamina
//! pick_job / deliver_job            → inventory + reputation side effects
//! recover_stamina(amount)           → only if the courier did not move
//! ```
//!
//! Movement, pickup and capacity failures are silent (`bool` or the job
//! handed back).  Delivering a job the courier does not hold is a caller bug
//! and returns [`AgentError::JobNotHeld`].

pub mod config;
pub mod courier;
pub mod error;
pub mod stamina;

#[cfg(test)]
mod tests;

pub use config::CourierConfig;
pub use courier::{Courier, DefeatReason, DeliveryOutcome};
pub use error::{AgentError, AgentResult};
pub use stamina::StaminaState;
