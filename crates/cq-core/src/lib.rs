//! `cq-core`: foundational types for the courier simulation engine.
//!
//! This crate is a dependency of every other `cq-*` crate.  It intentionally
//! has no `cq-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId` (player / AI), `Direction`                  |
//! | [`grid`]        | `GridPos`, Manhattan / Euclidean distances            |
//! | [`time`]        | `Tick`, `SessionClock`                                |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`weather`]     | `WeatherCondition` enum and its fixed tables          |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `cq-sim` snapshots.                            |

pub mod error;
pub mod grid;
pub mod ids;
pub mod rng;
pub mod time;
pub mod weather;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use grid::GridPos;
pub use ids::{AgentId, Direction};
pub use rng::{AgentRng, SimRng};
pub use time::{SessionClock, Tick};
pub use weather::WeatherCondition;
