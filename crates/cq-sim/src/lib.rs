//! `cq-sim`: the session orchestrator for the courier simulation engine.
//!
//! # Tick loop
//!
//! ```text
//! for each tick until a terminal status:
//!   ① Weather  : WeatherSimulator::update(now); condition → both couriers
//!   ② Refill   : pool empty and nobody carrying → JobSource::fetch
//!   ③ Job loss : one trial per courier; lost job → pool, −rep, cancellation
//!   ④ AI       : AiPlanner::next_move → move; deliver / pick up in range
//!   ⑤ Recovery : couriers that stayed put regain stamina
//!   ⑥ Status   : defeat › victory › time-up; finalize scores once
//! ```
//!
//! The player acts between ticks through `Session::attempt_move`,
//! `attempt_pickup`, `attempt_deliver` and `attempt_cancel`.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                  |
//! |-----------|---------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the pool's id set.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cq_sim::{NoopObserver, SessionBuilder, SessionConfig};
//!
//! let mut session = SessionBuilder::new(SessionConfig::default(), map)
//!     .job_source(source)
//!     .weather(weather)
//!     .build()?;
//! let status = session.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod observer;
pub mod pool;
pub mod session;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use builder::SessionBuilder;
pub use config::{JobLossConfig, SessionConfig};
pub use error::{SessionError, SessionResult};
pub use observer::{NoopObserver, SessionObserver};
pub use pool::JobPool;
pub use session::{NearbyJob, Session, SessionStatus};
pub use snapshot::{AgentSnapshot, SessionSnapshot};
