//! `AiPlanner`: difficulty dispatch for the AI courier.

use serde::{Deserialize, Serialize};

use cq_core::{AgentRng, Direction};

use crate::{AStarPlanner, DecisionPolicy, Difficulty, Greedy, PlanContext, PlannerMemory, Reactive};

/// Owns the AI's difficulty and memory; asked once per AI tick for a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiPlanner {
    difficulty: Difficulty,
    memory:     PlannerMemory,
}

impl AiPlanner {
    pub fn new(difficulty: Difficulty, history_len: usize) -> Self {
        Self { difficulty, memory: PlannerMemory::new(history_len) }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn memory(&self) -> &PlannerMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut PlannerMemory {
        &mut self.memory
    }

    /// Next cell chosen by the active policy.
    pub fn next_cell(&mut self, ctx: &PlanContext<'_>, rng: &mut AgentRng) -> Option<cq_core::GridPos> {
        self.memory.observe(ctx.position());
        let policy: &dyn DecisionPolicy = match self.difficulty {
            Difficulty::Reactive => &Reactive,
            Difficulty::Greedy   => &Greedy,
            Difficulty::AStar    => &AStarPlanner,
        };
        policy.next_target(ctx, &mut self.memory, rng)
    }

    /// Direction of the next step, or `None` to stay put.
    pub fn next_move(&mut self, ctx: &PlanContext<'_>, rng: &mut AgentRng) -> Option<Direction> {
        let cell = self.next_cell(ctx, rng)?;
        ctx.position().direction_to(cell)
    }
}
