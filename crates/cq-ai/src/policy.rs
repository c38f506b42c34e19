//! The `DecisionPolicy` trait and its configuration.

use serde::{Deserialize, Serialize};

use cq_core::{AgentRng, GridPos};

use crate::{AiError, PlanContext, PlannerMemory};

/// Pluggable AI strategy.
///
/// Given a read-only view of the tick and the agent's own memory, return the
/// cell the agent should occupy next: an orthogonal neighbour of the current
/// position, or the current position itself to stay put.  `None` means the
/// policy has nothing to say and the agent stays.
pub trait DecisionPolicy: Send + Sync {
    fn next_target(
        &self,
        ctx:    &PlanContext<'_>,
        memory: &mut PlannerMemory,
        rng:    &mut AgentRng,
    ) -> Option<GridPos>;
}

// ── Difficulty ────────────────────────────────────────────────────────────────

/// Which policy drives the AI.  Serialized as `1`, `2` or `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Reactive = 1,
    #[default]
    Greedy   = 2,
    AStar    = 3,
}

impl TryFrom<u8> for Difficulty {
    type Error = AiError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Reactive),
            2 => Ok(Difficulty::Greedy),
            3 => Ok(Difficulty::AStar),
            other => Err(AiError::UnknownDifficulty(other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> u8 {
        d as u8
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Difficulty::Reactive => "reactive",
            Difficulty::Greedy   => "greedy",
            Difficulty::AStar    => "astar",
        })
    }
}

// ── PlannerConfig ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Node-expansion cap for each A* search.
    pub astar_max_expanded: usize,
    /// Recent cells remembered for oscillation penalties.
    pub history_len: usize,
    /// Manhattan radius searched for a walkable stand-in when a target cell
    /// is blocked or unreachable.
    pub substitute_radius: u32,
    /// Chance the reactive policy steps towards its job instead of wandering.
    pub reactive_step_probability: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            astar_max_expanded:        cq_map::pathfinder::DEFAULT_MAX_EXPANDED,
            history_len:               8,
            substitute_radius:         3,
            reactive_step_probability: 0.9,
        }
    }
}
