//! The `Courier` entity.

use serde::{Deserialize, Serialize};

use cq_core::{AgentId, AgentRng, Direction, GridPos, WeatherCondition};
use cq_jobs::{Inventory, Job};
use cq_map::GridMap;

use crate::stamina::RECOVERY_THRESHOLD;
use crate::{AgentError, AgentResult, CourierConfig, StaminaState};

/// Reputation below which the session is lost.
pub const DEFEAT_REPUTATION: i32 = 20;

/// Reputation at or above which payouts get [`EXCELLENCE_MULTIPLIER`].
pub const EXCELLENCE_REPUTATION: i32 = 90;
pub const EXCELLENCE_MULTIPLIER: f64 = 1.05;

/// Consecutive non-negative adjustments that earn [`STREAK_BONUS`].
pub const STREAK_LENGTH: u32 = 3;
pub const STREAK_BONUS: i32 = 2;

// ── DefeatReason ──────────────────────────────────────────────────────────────

/// Terminal failure cause.  Recorded once; later causes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefeatReason {
    Reputation,
}

impl std::fmt::Display for DefeatReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefeatReason::Reputation => f.write_str("reputation"),
        }
    }
}

// ── DeliveryOutcome ───────────────────────────────────────────────────────────

/// Everything the score manager needs to know about one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub payout_applied:   f64,
    pub base_payout:      f64,
    pub bonus_multiplier: f64,
    /// Seconds past the deadline; `0.0` when on time or without deadline.
    pub lateness_seconds: f64,
    /// Net reputation change, streak bonus included.
    pub reputation_delta: i32,
    pub was_late:         bool,
}

// ── Courier ───────────────────────────────────────────────────────────────────

/// A delivery agent: position, stamina, reputation and the jobs it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    id:       AgentId,
    position: GridPos,
    config:   CourierConfig,

    inventory: Inventory,
    delivered: Vec<Job>,

    stamina:        f64,
    exhausted_lock: bool,

    reputation:        i32,
    reputation_streak: u32,
    defeat_reason:     Option<DefeatReason>,

    total_earned: f64,
    weather:      WeatherCondition,
}

impl Courier {
    pub fn new(id: AgentId, position: GridPos, config: CourierConfig) -> Self {
        Self {
            id,
            position,
            inventory: Inventory::new(config.max_weight),
            delivered: Vec::new(),
            stamina: config.start_stamina.clamp(0.0, config.stamina_max),
            exhausted_lock: false,
            reputation: config.start_reputation.clamp(0, 100),
            reputation_streak: 0,
            defeat_reason: None,
            total_earned: 0.0,
            weather: WeatherCondition::Clear,
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Jobs delivered this session, oldest first.
    pub fn delivered(&self) -> &[Job] {
        &self.delivered
    }

    pub fn stamina(&self) -> f64 {
        self.stamina
    }

    pub fn is_exhausted_locked(&self) -> bool {
        self.exhausted_lock
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    pub fn reputation_streak(&self) -> u32 {
        self.reputation_streak
    }

    pub fn defeat_reason(&self) -> Option<DefeatReason> {
        self.defeat_reason
    }

    pub fn total_earned(&self) -> f64 {
        self.total_earned
    }

    pub fn weather(&self) -> WeatherCondition {
        self.weather
    }

    pub fn current_load(&self) -> f64 {
        self.inventory.total_weight()
    }

    // ── Stamina ───────────────────────────────────────────────────────────

    pub fn stamina_state(&self) -> StaminaState {
        StaminaState::from_stamina(self.stamina)
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.stamina_state().speed_multiplier()
    }

    /// Locked couriers need [`RECOVERY_THRESHOLD`]; others need any stamina.
    pub fn can_move(&self) -> bool {
        if self.exhausted_lock {
            self.stamina >= RECOVERY_THRESHOLD
        } else {
            self.stamina > 0.0
        }
    }

    /// Stamina spent by one cell of movement under current load and weather.
    pub fn move_cost(&self) -> f64 {
        let c = &self.config;
        c.base_move_cost
            + c.load_surcharge * (self.current_load() - c.free_load).max(0.0)
            + self.weather.stamina_surcharge()
    }

    /// Regain stamina while stationary, capped at the maximum.
    pub fn recover_stamina(&mut self, amount: f64) {
        self.stamina = (self.stamina + amount).min(self.config.stamina_max);
        if self.exhausted_lock && self.stamina >= RECOVERY_THRESHOLD {
            self.exhausted_lock = false;
            tracing::debug!(agent = %self.id, stamina = self.stamina, "exhausted lock cleared");
        }
    }

    /// Weather for this tick's surcharge; set by the session.
    pub fn set_weather(&mut self, condition: WeatherCondition) {
        self.weather = condition;
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Move to `target` if allowed.  Returns `false` with no state change when
    /// the courier cannot move or the cell is off-map or blocked.
    pub fn move_to(&mut self, map: &GridMap, target: GridPos) -> bool {
        if !self.can_move() || !map.is_walkable(target) {
            return false;
        }
        self.position = target;
        self.stamina = (self.stamina - self.move_cost()).max(0.0);
        if self.stamina <= 0.0 && !self.exhausted_lock {
            self.exhausted_lock = true;
            tracing::debug!(agent = %self.id, "courier exhausted");
        }
        true
    }

    pub fn move_by(&mut self, map: &GridMap, dx: i32, dy: i32) -> bool {
        let target = self.position.offset(dx, dy);
        self.move_to(map, target)
    }

    pub fn move_dir(&mut self, map: &GridMap, dir: Direction) -> bool {
        let target = self.position.step(dir);
        self.move_to(map, target)
    }

    // ── Jobs ──────────────────────────────────────────────────────────────

    /// Take `job` into the inventory and claim it.
    ///
    /// Hands the job back untouched if it belongs to the other agent or does
    /// not fit.
    pub fn pick_job(&mut self, mut job: Job) -> Result<(), Job> {
        if !job.is_available_to(self.id) {
            return Err(job);
        }
        let previous_owner = job.owner;
        job.owner = Some(self.id);
        self.inventory.add_job(job).map_err(|mut j| {
            j.owner = previous_owner;
            j
        })
    }

    /// Release a held job back to circulation, ownerless.
    pub fn drop_job(&mut self, id: &str) -> Option<Job> {
        let mut job = self.inventory.remove_job(id)?;
        job.owner = None;
        Some(job)
    }

    pub fn holds(&self, id: &str) -> bool {
        self.inventory.contains(id)
    }

    /// Deliver a held job at time `now`.
    ///
    /// Applies the lateness-tier reputation change (with streak and defeat
    /// checks), the excellence multiplier, and moves the job to the
    /// delivered list.
    pub fn deliver_job(&mut self, id: &str, now: f64) -> AgentResult<DeliveryOutcome> {
        let Some(job) = self.inventory.remove_job(id) else {
            return Err(AgentError::JobNotHeld { agent: self.id, job: id.to_owned() });
        };

        let delta = job.time_until_deadline(now);
        let lateness_seconds = match delta {
            Some(d) if d < 0.0 => -d,
            _ => 0.0,
        };
        let mut total_duration = job.total_duration();
        if total_duration <= 0.0 {
            total_duration = 1.0;
        }

        let tier = match delta {
            None => 3,
            Some(d) if d >= 0.2 * total_duration => 5,
            Some(d) if d >= 0.0 => 3,
            Some(_) if lateness_seconds <= 30.0 => -2,
            Some(_) if lateness_seconds <= 120.0 => -5,
            Some(_) => -10,
        };

        let before = self.reputation;
        self.adjust_reputation(tier);

        let base_payout = job.payout;
        let bonus_multiplier =
            if self.reputation >= EXCELLENCE_REPUTATION { EXCELLENCE_MULTIPLIER } else { 1.0 };
        let payout_applied = base_payout * bonus_multiplier;
        self.total_earned += payout_applied;

        tracing::info!(
            agent = %self.id,
            job = %job.id,
            payout = payout_applied,
            lateness = lateness_seconds,
            reputation = self.reputation,
            "job delivered"
        );
        self.delivered.push(job);

        Ok(DeliveryOutcome {
            payout_applied,
            base_payout,
            bonus_multiplier,
            lateness_seconds,
            reputation_delta: self.reputation - before,
            was_late: lateness_seconds > 0.0,
        })
    }

    // ── Reputation ────────────────────────────────────────────────────────

    /// Apply `delta` clamped to `[0, 100]`, then update the streak.
    ///
    /// A third consecutive non-negative adjustment grants [`STREAK_BONUS`],
    /// applied with the same clamp and defeat check, and restarts the count.
    pub fn adjust_reputation(&mut self, delta: i32) {
        self.apply_reputation(delta);
        if delta < 0 {
            self.reputation_streak = 0;
            return;
        }
        self.reputation_streak += 1;
        if self.reputation_streak == STREAK_LENGTH {
            self.apply_reputation(STREAK_BONUS);
            self.reputation_streak = 0;
        }
    }

    fn apply_reputation(&mut self, delta: i32) {
        self.reputation = (self.reputation + delta).clamp(0, 100);
        if self.reputation < DEFEAT_REPUTATION {
            self.trigger_defeat(DefeatReason::Reputation);
        }
    }

    /// Record a defeat cause unless one is already set.
    pub fn trigger_defeat(&mut self, reason: DefeatReason) {
        if self.defeat_reason.is_none() {
            tracing::info!(agent = %self.id, %reason, "courier defeated");
            self.defeat_reason = Some(reason);
        }
    }

    // ── Job loss ──────────────────────────────────────────────────────────

    /// Per-tick loss trial: two uniform draws in `0..=range`; if they match,
    /// a random held job is dropped and returned ownerless.
    ///
    /// Never draws when the inventory is empty.  The caller applies the
    /// reputation penalty and records the cancellation.
    pub fn roll_job_loss(&mut self, rng: &mut AgentRng, range: u32) -> Option<Job> {
        if self.inventory.is_empty() {
            return None;
        }
        let a: u32 = rng.gen_range(0..=range);
        let b: u32 = rng.gen_range(0..=range);
        if a != b {
            return None;
        }
        let idx = rng.gen_range(0..self.inventory.len());
        let id = self.inventory.as_slice()[idx].id.clone();
        let job = self.drop_job(&id)?;
        tracing::info!(agent = %self.id, job = %job.id, "job lost");
        Some(job)
    }
}
