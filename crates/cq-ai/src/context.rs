//! Read-only view of one AI tick.

use cq_agent::Courier;
use cq_core::GridPos;
use cq_jobs::Job;
use cq_map::GridMap;

use crate::PlannerConfig;

/// Everything a [`DecisionPolicy`][crate::DecisionPolicy] may look at.
///
/// Built by the session once per AI tick; all borrows end before the
/// chosen move is applied.
pub struct PlanContext<'a> {
    pub map:    &'a GridMap,
    /// The AI courier itself.
    pub me:     &'a Courier,
    /// Jobs lying on the map (not in any inventory).
    pub pool:   &'a [Job],
    /// Session clock, seconds.
    pub now:    f64,
    pub config: &'a PlannerConfig,
}

/// A place the agent could head for, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub job:      &'a Job,
    pub target:   GridPos,
    /// `true` for a held job (go to dropoff), `false` for a pickup.
    pub delivery: bool,
}

impl<'a> PlanContext<'a> {
    pub fn new(
        map:    &'a GridMap,
        me:     &'a Courier,
        pool:   &'a [Job],
        now:    f64,
        config: &'a PlannerConfig,
    ) -> Self {
        Self { map, me, pool, now, config }
    }

    pub fn position(&self) -> GridPos {
        self.me.position()
    }

    /// Held jobs as dropoff targets, then released pool jobs this agent may
    /// claim and can carry as pickup targets.  Jobs owned by the other agent
    /// never appear.
    pub fn candidates(&self) -> Vec<Candidate<'a>> {
        let me = self.me;
        let inventory = me.inventory();
        let held = inventory.iter().map(|job| Candidate { job, target: job.dropoff, delivery: true });
        let now = self.now;
        let pickups = self
            .pool
            .iter()
            .filter(move |job| {
                job.is_available_to(me.id())
                    && job.is_released(now)
                    && !inventory.contains(&job.id)
                    && inventory.can_add(job)
            })
            .map(|job| Candidate { job, target: job.pickup, delivery: false });
        held.chain(pickups).collect()
    }

    /// The candidate for job `id`, if it is still one.
    pub fn candidate_for(&self, id: &str) -> Option<Candidate<'a>> {
        self.candidates().into_iter().find(|c| c.job.id == id)
    }
}
