//! The `Session` struct and its tick loop.

use std::fmt;

use serde::{Deserialize, Serialize};

use cq_agent::{Courier, DefeatReason, DeliveryOutcome};
use cq_ai::{AiPlanner, PlanContext};
use cq_core::{AgentId, AgentRng, Direction, GridPos, SessionClock, Tick};
use cq_jobs::{Job, JobSource};
use cq_map::GridMap;
use cq_score::{ScoreEvent, ScoreManager};
use cq_weather::{WeatherInfo, WeatherSimulator};

use crate::{JobPool, SessionConfig, SessionError, SessionObserver, SessionResult};

// ── SessionStatus ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    /// `agent` reached the map's earnings goal.
    Victory { agent: AgentId },
    Defeat { agent: AgentId, reason: DefeatReason },
    TimeUp,
}

impl SessionStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Running                 => f.write_str("running"),
            SessionStatus::Victory { agent }       => write!(f, "victory ({agent})"),
            SessionStatus::Defeat { agent, reason } => write!(f, "defeat ({agent}: {reason})"),
            SessionStatus::TimeUp                  => f.write_str("time up"),
        }
    }
}

// ── Per-agent state ───────────────────────────────────────────────────────────

/// Everything the session keeps for one courier.
#[derive(Debug, Clone)]
pub(crate) struct AgentSlot {
    pub(crate) courier:       Courier,
    pub(crate) rng:           AgentRng,
    pub(crate) score:         ScoreManager,
    /// Position at the end of the previous tick; staying put earns recovery.
    pub(crate) last_position: GridPos,
}

/// Result of [`Session::nearest_job`].
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyJob<'a> {
    pub job:      &'a Job,
    pub target:   GridPos,
    /// `true` for a held job (its dropoff), `false` for a pool job (pickup).
    pub delivery: bool,
    /// Euclidean distance from the agent to `target`.
    pub distance: f64,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One two-courier delivery session.
///
/// Each [`step`](Self::step) runs one tick:
///
/// 1. **Weather**: update the simulator and push its condition to both
///    couriers.
/// 2. **Refill**: when the pool is empty and nobody carries anything, fetch a
///    new batch from the job source.
/// 3. **Job loss**: one loss trial per courier; a lost job returns to the
///    pool and costs reputation plus a cancellation penalty.
/// 4. **AI**: ask the planner for a move, apply it, then deliver held jobs
///    and pick up one job within the interaction radius.
/// 5. **Recovery**: couriers whose position did not change since the last
///    tick regain stamina.
/// 6. **Status**: defeat, then victory, then time-up; the first terminal
///    status finalizes both score ledgers.
///
/// The player acts between steps through the `attempt_*` mutators.
///
/// Create via [`SessionBuilder`][crate::SessionBuilder].
pub struct Session {
    pub(crate) config:  SessionConfig,
    pub(crate) clock:   SessionClock,
    pub(crate) map:     GridMap,
    pub(crate) pool:    JobPool,
    pub(crate) source:  Box<dyn JobSource>,
    pub(crate) weather: WeatherSimulator,
    /// Indexed by [`AgentId::index`].
    pub(crate) agents:  [AgentSlot; 2],
    pub(crate) planner: AiPlanner,
    pub(crate) status:  SessionStatus,
    /// Score events not yet reported to an observer.
    pub(crate) pending: Vec<(AgentId, ScoreEvent)>,
}

impl Session {
    // ── Read access ───────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Absolute session time, seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn time_left(&self) -> f64 {
        self.clock.time_left(self.config.session_duration_secs)
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn pool(&self) -> &JobPool {
        &self.pool
    }

    pub fn courier(&self, agent: AgentId) -> &Courier {
        &self.agents[agent.index()].courier
    }

    pub fn score(&self, agent: AgentId) -> &ScoreManager {
        &self.agents[agent.index()].score
    }

    pub fn planner(&self) -> &AiPlanner {
        &self.planner
    }

    pub fn weather(&self) -> &WeatherSimulator {
        &self.weather
    }

    pub fn weather_info(&self) -> WeatherInfo {
        self.weather.info(self.now())
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Step until the session reaches a terminal status.
    pub fn run<O: SessionObserver>(&mut self, observer: &mut O) -> SessionResult<SessionStatus> {
        while !self.status.is_over() {
            self.step(observer)?;
        }
        Ok(self.status)
    }

    /// Step at most `n` ticks, stopping early if the session ends.
    pub fn run_ticks<O: SessionObserver>(&mut self, n: u64, observer: &mut O) -> SessionResult<SessionStatus> {
        for _ in 0..n {
            if self.status.is_over() {
                break;
            }
            self.step(observer)?;
        }
        Ok(self.status)
    }

    /// Run one tick.  A finished session is left untouched.
    pub fn step<O: SessionObserver>(&mut self, observer: &mut O) -> SessionResult<SessionStatus> {
        if self.status.is_over() {
            return Ok(self.status);
        }
        let tick = self.clock.current_tick;
        let now = self.clock.now();
        observer.on_tick_start(tick);

        // ── Phase 1: weather ──────────────────────────────────────────────
        let update = self.weather.update(now);
        for slot in &mut self.agents {
            slot.courier.set_weather(update.condition);
        }

        // ── Phase 2: pool refill ──────────────────────────────────────────
        self.refill_pool()?;

        // ── Phase 3: job loss ─────────────────────────────────────────────
        if self.config.job_loss.enabled {
            for agent in AgentId::ALL {
                self.roll_job_loss(agent);
            }
        }

        // ── Phase 4: AI move and interactions ─────────────────────────────
        self.ai_step(now)?;

        // ── Phase 5: stationary recovery ──────────────────────────────────
        for slot in &mut self.agents {
            let pos = slot.courier.position();
            if pos == slot.last_position {
                slot.courier.recover_stamina(self.config.recovery_per_tick);
            }
            slot.last_position = pos;
        }

        // ── Phase 6: terminal status ──────────────────────────────────────
        self.clock.advance();
        self.evaluate_status()?;

        for (agent, event) in self.pending.drain(..) {
            observer.on_score_event(tick, agent, &event);
        }
        observer.on_tick_end(tick, self);
        if self.status.is_over() {
            observer.on_session_end(tick, &self.status);
        }
        Ok(self.status)
    }

    // ── Mutators ──────────────────────────────────────────────────────────

    /// Move `agent` one cell.  `false` if the move was illegal, the courier
    /// is exhausted, or the session is over.
    pub fn attempt_move(&mut self, agent: AgentId, dir: Direction) -> bool {
        if self.status.is_over() {
            return false;
        }
        self.agents[agent.index()].courier.move_dir(&self.map, dir)
    }

    /// Pick up pool job `id` if it is released, within the interaction
    /// radius, not owned by the other agent, and fits.
    ///
    /// A job held by either courier is a silent `false`; an id that is not in
    /// circulation at all is [`SessionError::UnknownJob`].
    pub fn attempt_pickup(&mut self, agent: AgentId, id: &str) -> SessionResult<bool> {
        if self.status.is_over() {
            return Ok(false);
        }
        let Some(job) = self.pool.get(id) else {
            if self.agents.iter().any(|s| s.courier.holds(id)) {
                return Ok(false);
            }
            return Err(SessionError::UnknownJob { agent, job: id.to_owned() });
        };
        let now = self.clock.now();
        let pos = self.courier(agent).position();
        if pos.manhattan(job.pickup) > self.config.interaction_radius || !job.is_released(now) {
            return Ok(false);
        }
        Ok(self.pickup(agent, id, now))
    }

    /// Deliver held job `id` if the agent is within the interaction radius of
    /// its dropoff.  `Ok(None)` when out of range or the session is over.
    pub fn attempt_deliver(&mut self, agent: AgentId, id: &str) -> SessionResult<Option<DeliveryOutcome>> {
        if self.status.is_over() {
            return Ok(None);
        }
        let me = self.courier(agent);
        let Some(job) = me.inventory().get(id) else {
            return Err(SessionError::UnknownJob { agent, job: id.to_owned() });
        };
        if me.position().manhattan(job.dropoff) > self.config.interaction_radius {
            return Ok(None);
        }
        let now = self.clock.now();
        self.deliver(agent, id, now).map(Some)
    }

    /// Give up held job `id`: it returns ownerless to the pool, the agent
    /// loses reputation and is charged a cancellation.
    pub fn attempt_cancel(&mut self, agent: AgentId, id: &str) -> SessionResult<Option<ScoreEvent>> {
        if self.status.is_over() {
            return Ok(None);
        }
        let Some(job) = self.agents[agent.index()].courier.drop_job(id) else {
            return Err(SessionError::UnknownJob { agent, job: id.to_owned() });
        };
        tracing::info!(%agent, job = %job.id, "job cancelled");
        Ok(Some(self.release_job(agent, job)))
    }

    /// Closest job `agent` could act on within `max_distance` (Euclidean):
    /// held jobs by dropoff, claimable released pool jobs by pickup.  Ties go
    /// to deliveries.
    pub fn nearest_job(&self, agent: AgentId, max_distance: f64) -> Option<NearbyJob<'_>> {
        let me = self.courier(agent);
        let pos = me.position();
        let now = self.clock.now();
        let held = me.inventory().iter().map(|job| (job, job.dropoff, true));
        let claimable = self
            .pool
            .iter()
            .filter(|job| job.is_available_to(agent) && job.is_released(now) && me.inventory().can_add(job))
            .map(|job| (job, job.pickup, false));
        held.chain(claimable)
            .map(|(job, target, delivery)| NearbyJob { job, target, delivery, distance: pos.euclidean(target) })
            .filter(|n| n.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| b.delivery.cmp(&a.delivery)))
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    fn refill_pool(&mut self) -> SessionResult<usize> {
        let idle = self.pool.is_empty() && self.agents.iter().all(|s| s.courier.inventory().is_empty());
        if !idle {
            return Ok(0);
        }
        let records = self.source.fetch()?;
        let agents = &self.agents;
        let added = self.pool.refill(records, self.clock.epoch_secs, |id| {
            agents.iter().any(|slot| slot.courier.holds(id))
        });
        if added > 0 {
            tracing::info!(added, tick = self.clock.current_tick.0, "job pool refilled");
        }
        Ok(added)
    }

    fn roll_job_loss(&mut self, agent: AgentId) {
        let range = self.config.job_loss.range;
        let slot = &mut self.agents[agent.index()];
        if let Some(job) = slot.courier.roll_job_loss(&mut slot.rng, range) {
            self.release_job(agent, job);
        }
    }

    fn ai_step(&mut self, now: f64) -> SessionResult<()> {
        let slot = &mut self.agents[AgentId::Ai.index()];
        if slot.courier.can_move() {
            let ctx = PlanContext::new(&self.map, &slot.courier, self.pool.as_slice(), now, &self.config.planner);
            let dir = self.planner.next_move(&ctx, &mut slot.rng);
            if let Some(dir) = dir {
                if !slot.courier.move_dir(&self.map, dir) {
                    tracing::debug!(?dir, "ai move rejected");
                }
            }
        }

        let agent = AgentId::Ai;
        let radius = self.config.interaction_radius;
        let pos = self.courier(agent).position();
        let due: Vec<String> = self
            .courier(agent)
            .inventory()
            .iter()
            .filter(|job| pos.manhattan(job.dropoff) <= radius)
            .map(|job| job.id.clone())
            .collect();
        for id in due {
            self.deliver(agent, &id, now)?;
        }

        if let Some(id) = self.ai_pickup_choice(pos, now) {
            self.pickup(agent, &id, now);
        }
        Ok(())
    }

    /// The AI's focus job if it is claimable in range, else the nearest
    /// claimable job in range.
    fn ai_pickup_choice(&self, pos: GridPos, now: f64) -> Option<String> {
        let me = self.courier(AgentId::Ai);
        let radius = self.config.interaction_radius;
        let focus = self.planner.memory().focus.as_deref();
        self.pool
            .iter()
            .filter(|job| {
                job.is_available_to(AgentId::Ai)
                    && job.is_released(now)
                    && me.inventory().can_add(job)
                    && pos.manhattan(job.pickup) <= radius
            })
            .min_by_key(|job| (Some(job.id.as_str()) != focus, pos.manhattan(job.pickup)))
            .map(|job| job.id.clone())
    }

    fn evaluate_status(&mut self) -> SessionResult<()> {
        let status = self.terminal_status();
        if !status.is_over() {
            return Ok(());
        }
        self.status = status;
        let time_left = self.time_left();
        tracing::info!(%status, tick = self.clock.current_tick.0, time_left, "session over");
        for agent in AgentId::ALL {
            let breakdown = self.agents[agent.index()]
                .score
                .finalize(time_left, self.config.session_duration_secs)?;
            self.pending.push((
                agent,
                ScoreEvent::Finalized { time_bonus: breakdown.time_bonus, total: breakdown.total_points() },
            ));
        }
        Ok(())
    }

    fn terminal_status(&self) -> SessionStatus {
        for agent in AgentId::ALL {
            if let Some(reason) = self.courier(agent).defeat_reason() {
                return SessionStatus::Defeat { agent, reason };
            }
        }
        let goal = self.map.goal();
        if goal > 0.0 {
            for agent in AgentId::ALL {
                if self.courier(agent).total_earned() >= goal {
                    return SessionStatus::Victory { agent };
                }
            }
        }
        if self.clock.current_tick.0 >= self.config.total_ticks() {
            return SessionStatus::TimeUp;
        }
        SessionStatus::Running
    }

    // ── Shared transactions ───────────────────────────────────────────────

    /// Move pool job `id` into `agent`'s inventory.  Checks ownership and
    /// capacity first so a refusal leaves pool order intact.
    fn pickup(&mut self, agent: AgentId, id: &str, now: f64) -> bool {
        let claimable = match self.pool.get(id) {
            Some(job) => job.is_available_to(agent) && self.courier(agent).inventory().can_add(job),
            None => false,
        };
        if !claimable {
            return false;
        }
        let Some(job) = self.pool.take(id) else {
            return false;
        };
        match self.agents[agent.index()].courier.pick_job(job) {
            Ok(()) => {
                tracing::info!(%agent, job = id, now, "job picked up");
                true
            }
            Err(job) => {
                self.pool.put_back(job);
                false
            }
        }
    }

    fn deliver(&mut self, agent: AgentId, id: &str, now: f64) -> SessionResult<DeliveryOutcome> {
        let slot = &mut self.agents[agent.index()];
        let outcome = slot.courier.deliver_job(id, now)?;
        if let Some(job) = slot.courier.delivered().last() {
            let event = slot.score.register_delivery(job, &outcome);
            self.pending.push((agent, event));
        }
        if agent == AgentId::Ai && self.planner.memory().focus.as_deref() == Some(id) {
            self.planner.memory_mut().release_focus();
        }
        Ok(outcome)
    }

    /// Return `job` to the pool and charge `agent` for it.
    fn release_job(&mut self, agent: AgentId, job: Job) -> ScoreEvent {
        let slot = &mut self.agents[agent.index()];
        slot.courier.adjust_reputation(-self.config.job_loss.reputation_penalty);
        let event = slot.score.register_cancellation(&job);
        self.pending.push((agent, event.clone()));
        if agent == AgentId::Ai && self.planner.memory().focus.as_deref() == Some(job.id.as_str()) {
            self.planner.memory_mut().release_focus();
        }
        self.pool.put_back(job);
        event
    }
}
