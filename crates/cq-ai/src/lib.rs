//! `cq-ai`: the AI courier's decision policies.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`context`]  | `PlanContext<'a>` read-only tick view, `Candidate` targets    |
//! | [`memory`]   | `PlannerMemory` (focus job, step history), `PathCache`        |
//! | [`policy`]   | `DecisionPolicy` trait, `Difficulty`, `PlannerConfig`         |
//! | [`reactive`] | `Reactive`: biased random walk towards one job               |
//! | [`greedy`]   | `Greedy`: nearest target by Manhattan distance               |
//! | [`astar`]    | `AStarPlanner`: ranked target, cached A* path                |
//! | [`planner`]  | `AiPlanner`: difficulty dispatch + direction conversion      |
//! | [`error`]    | `AiError`, `AiResult<T>`                                      |
//!
//! # Fallback chain
//!
//! ```text
//! AStarPlanner ──(no path / no target)──▶ Greedy ──(no move)──▶ Reactive
//! ```
//!
//! Every policy returns the next cell to occupy.  [`AiPlanner::next_move`]
//! turns that into a [`cq_core::Direction`], or `None` to stay put.
//!
//! Policies are stateless (`&self`); everything that persists between ticks
//! lives in the per-agent [`PlannerMemory`].

pub mod astar;
pub mod context;
pub mod error;
pub mod greedy;
pub mod memory;
pub mod planner;
pub mod policy;
pub mod reactive;


pub use astar::AStarPlanner;
pub use context::{Candidate, PlanContext};
pub use error::{AiError, AiResult};
pub use greedy::Greedy;
pub use memory::{PathCache, PlannerMemory};
pub use planner::AiPlanner;
pub use policy::{DecisionPolicy, Difficulty, PlannerConfig};
pub use reactive::Reactive;
