//! Difficulty 3: ranked target, cached A* path.
//!
//! # Per-tick flow
//!
//! ```text
//! target = focus job if still a candidate
//!          else best by (priority desc, deadline asc, distance asc)
//! step   = cache.next_step(target, generation, pos)
//!          on miss: A* to target, or to the nearest walkable stand-in
//!                   within `substitute_radius`; store in cache
//! fail   → Greedy, and remember the failed key: later ticks go straight
//!          to Greedy until the target or generation changes
//! ```

use std::cmp::Ordering;

use cq_core::{AgentRng, GridPos};
use cq_map::{AStarPathfinder, GridPath, GridMap, Pathfinder};

use crate::{Candidate, DecisionPolicy, Greedy, PlanContext, PlannerMemory};

#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl AStarPlanner {
    /// Ordering used to choose a fresh target.
    fn rank(pos: GridPos, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        b.job
            .priority
            .cmp(&a.job.priority)
            .then_with(|| a.job.deadline_sort_key().total_cmp(&b.job.deadline_sort_key()))
            .then_with(|| pos.manhattan(a.target).cmp(&pos.manhattan(b.target)))
            .then_with(|| b.delivery.cmp(&a.delivery))
    }

    fn select<'a>(ctx: &PlanContext<'a>, memory: &mut PlannerMemory) -> Option<Candidate<'a>> {
        if let Some(c) = memory.focus.as_deref().and_then(|id| ctx.candidate_for(id)) {
            return Some(c);
        }
        let pos = ctx.position();
        let best = ctx.candidates().into_iter().min_by(|a, b| Self::rank(pos, a, b));
        if let Some(c) = &best {
            memory.focus = Some(c.job.id.clone());
            memory.invalidate();
        }
        best
    }

    /// Walkable cells within `radius` of `target`, nearest to the target
    /// first, then nearest to `from`.
    fn substitutes(map: &GridMap, target: GridPos, from: GridPos, radius: u32) -> Vec<GridPos> {
        let r = radius as i32;
        let mut cells: Vec<GridPos> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| target.offset(dx, dy)))
            .filter(|&c| c != target && c.manhattan(target) <= radius && map.is_walkable(c))
            .collect();
        cells.sort_by_key(|&c| (c.manhattan(target), c.manhattan(from), c.y, c.x));
        cells
    }

    fn plan(ctx: &PlanContext<'_>, from: GridPos, target: GridPos) -> Option<GridPath> {
        let finder = AStarPathfinder::new(ctx.config.astar_max_expanded);
        if ctx.map.is_walkable(target) {
            match finder.find_path(ctx.map, from, target) {
                Ok(path) => return Some(path),
                Err(e) => tracing::debug!(error = %e, "direct path failed, trying stand-ins"),
            }
        }
        Self::substitutes(ctx.map, target, from, ctx.config.substitute_radius)
            .into_iter()
            .find_map(|cell| finder.find_path(ctx.map, from, cell).ok())
    }
}

impl DecisionPolicy for AStarPlanner {
    fn next_target(
        &self,
        ctx:    &PlanContext<'_>,
        memory: &mut PlannerMemory,
        rng:    &mut AgentRng,
    ) -> Option<GridPos> {
        let pos = ctx.position();
        let Some(cand) = Self::select(ctx, memory) else {
            return Greedy.next_target(ctx, memory, rng);
        };
        if cand.target == pos {
            return Some(pos);
        }

        let generation = memory.generation();
        if let Some(step) = memory.cache.next_step(cand.target, generation, pos) {
            if ctx.map.is_walkable(step) {
                return Some(step);
            }
            memory.invalidate();
        }

        let generation = memory.generation();
        if memory.cache.has_failed(cand.target, generation) {
            return Greedy.next_target(ctx, memory, rng);
        }
        match Self::plan(ctx, pos, cand.target) {
            Some(path) => {
                tracing::debug!(
                    from = %pos,
                    target = %cand.target,
                    steps = path.steps(),
                    cost = path.total_cost,
                    "A* path computed"
                );
                let step = path.cells.get(1).copied();
                memory.cache.store(cand.target, generation, path.cells);
                // A stand-in we are already standing on: wait here.
                step.or(Some(pos))
            }
            None => {
                tracing::debug!(from = %pos, target = %cand.target, "no path, falling back to greedy");
                memory.cache.mark_failed(cand.target, generation);
                Greedy.next_target(ctx, memory, rng)
            }
        }
    }
}
