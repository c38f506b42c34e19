//! Difficulty 1: a biased random walk.

use cq_core::{AgentRng, Direction, GridPos};

use crate::{Candidate, DecisionPolicy, PlanContext, PlannerMemory};

/// Heads for one job (kept across ticks, else drawn at random) with
/// probability `reactive_step_probability`; otherwise, or when that step is
/// illegal, wanders to a random neighbour without reversing.  Stays put when
/// boxed in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reactive;

impl Reactive {
    fn pick<'a>(
        ctx:    &PlanContext<'a>,
        memory: &mut PlannerMemory,
        rng:    &mut AgentRng,
    ) -> Option<Candidate<'a>> {
        if let Some(c) = memory.focus.as_deref().and_then(|id| ctx.candidate_for(id)) {
            return Some(c);
        }
        let candidates = ctx.candidates();
        let chosen = rng.choose(&candidates).cloned();
        memory.focus = chosen.as_ref().map(|c| c.job.id.clone());
        chosen
    }
}

/// One step from `pos` towards `target` along the axis with the larger gap
/// (horizontal on ties).
pub(crate) fn step_towards(pos: GridPos, target: GridPos) -> Option<GridPos> {
    let dx = target.x - pos.x;
    let dy = target.y - pos.y;
    if dx == 0 && dy == 0 {
        return None;
    }
    Some(if dx.abs() >= dy.abs() {
        pos.offset(dx.signum(), 0)
    } else {
        pos.offset(0, dy.signum())
    })
}

impl DecisionPolicy for Reactive {
    fn next_target(
        &self,
        ctx:    &PlanContext<'_>,
        memory: &mut PlannerMemory,
        rng:    &mut AgentRng,
    ) -> Option<GridPos> {
        let pos = ctx.position();
        let previous = memory.previous();
        let legal = |cell: GridPos| ctx.map.is_walkable(cell) && Some(cell) != previous;

        if let Some(cand) = Self::pick(ctx, memory, rng) {
            if let Some(step) = step_towards(pos, cand.target) {
                if rng.gen_bool(ctx.config.reactive_step_probability.clamp(0.0, 1.0)) && legal(step) {
                    return Some(step);
                }
            }
        }

        let mut dirs = Direction::ALL;
        rng.shuffle(&mut dirs);
        dirs.into_iter()
            .map(|d| pos.step(d))
            .find(|&cell| legal(cell))
            .or(Some(pos))
    }
}
