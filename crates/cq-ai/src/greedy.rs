//! Difficulty 2: nearest target first.

use cq_core::{AgentRng, GridPos};

use crate::{Candidate, DecisionPolicy, PlanContext, PlannerMemory, Reactive};

/// Cost added per recent visit when scoring a step.
const HISTORY_PENALTY: u32 = 2;

/// Goes for the candidate with the smallest Manhattan distance (deliveries
/// win ties), stepping along whichever axis reduces it and avoiding cells in
/// the recent history.  Falls back to [`Reactive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Greedy {
    /// Nearest candidate; ties go to deliveries, then to list order.
    pub fn nearest<'a>(pos: GridPos, candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
        candidates
            .iter()
            .min_by_key(|c| (pos.manhattan(c.target), !c.delivery))
            .cloned()
    }

    /// Best legal step from `pos` towards `target`, or `None`.
    pub(crate) fn step(
        ctx:    &PlanContext<'_>,
        memory: &PlannerMemory,
        pos:    GridPos,
        target: GridPos,
    ) -> Option<GridPos> {
        let mut options = Vec::with_capacity(2);
        if target.x > pos.x {
            options.push(pos.offset(1, 0));
        }
        if target.x < pos.x {
            options.push(pos.offset(-1, 0));
        }
        if target.y > pos.y {
            options.push(pos.offset(0, 1));
        }
        if target.y < pos.y {
            options.push(pos.offset(0, -1));
        }
        options
            .into_iter()
            .filter(|&cell| ctx.map.is_walkable(cell) && Some(cell) != memory.previous())
            .min_by_key(|&cell| cell.manhattan(target) + HISTORY_PENALTY * memory.visits(cell) as u32)
    }
}

impl DecisionPolicy for Greedy {
    fn next_target(
        &self,
        ctx:    &PlanContext<'_>,
        memory: &mut PlannerMemory,
        rng:    &mut AgentRng,
    ) -> Option<GridPos> {
        let pos = ctx.position();
        let Some(best) = Self::nearest(pos, &ctx.candidates()) else {
            return Reactive.next_target(ctx, memory, rng);
        };
        memory.focus = Some(best.job.id.clone());
        if best.target == pos {
            return Some(pos);
        }
        Self::step(ctx, memory, pos, best.target).or_else(|| Reactive.next_target(ctx, memory, rng))
    }
}
