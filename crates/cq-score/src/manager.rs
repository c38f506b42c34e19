//! The score ledger.

use serde::{Deserialize, Serialize};

use cq_agent::DeliveryOutcome;
use cq_jobs::Job;

use crate::{ScoreConfig, ScoreError, ScoreResult};

// ── LatenessTier ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatenessTier {
    OnTime,
    /// `(0, 30]` seconds late.
    Minor,
    /// `(30, 120]` seconds late.
    Moderate,
    Severe,
}

impl LatenessTier {
    pub fn from_lateness(secs: f64) -> Self {
        if secs <= 0.0 {
            LatenessTier::OnTime
        } else if secs <= 30.0 {
            LatenessTier::Minor
        } else if secs <= 120.0 {
            LatenessTier::Moderate
        } else {
            LatenessTier::Severe
        }
    }

    pub fn penalty(self, config: &ScoreConfig) -> f64 {
        match self {
            LatenessTier::OnTime   => 0.0,
            LatenessTier::Minor    => config.minor_late_penalty,
            LatenessTier::Moderate => config.moderate_late_penalty,
            LatenessTier::Severe   => config.severe_late_penalty,
        }
    }
}

// ── ScoreBreakdown ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_income:   f64,
    pub penalty_total: f64,
    pub time_bonus:    f64,
}

impl ScoreBreakdown {
    /// Floored at zero.
    pub fn total_points(&self) -> f64 {
        (self.base_income + self.time_bonus - self.penalty_total).max(0.0)
    }
}

// ── ScoreEvent ────────────────────────────────────────────────────────────────

/// One ledger entry, returned by each register call for output writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreEvent {
    Delivery {
        job:     String,
        income:  f64,
        tier:    LatenessTier,
        penalty: f64,
    },
    Cancellation {
        job:     String,
        penalty: f64,
    },
    Finalized {
        time_bonus: f64,
        total:      f64,
    },
}

impl ScoreEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoreEvent::Delivery { .. }     => "delivery",
            ScoreEvent::Cancellation { .. } => "cancellation",
            ScoreEvent::Finalized { .. }    => "finalized",
        }
    }

    pub fn job(&self) -> Option<&str> {
        match self {
            ScoreEvent::Delivery { job, .. } | ScoreEvent::Cancellation { job, .. } => Some(job),
            ScoreEvent::Finalized { .. } => None,
        }
    }

    /// Net change to the unfloored total.
    pub fn points_delta(&self) -> f64 {
        match *self {
            ScoreEvent::Delivery { income, penalty, .. } => income - penalty,
            ScoreEvent::Cancellation { penalty, .. }     => -penalty,
            ScoreEvent::Finalized { time_bonus, .. }     => time_bonus,
        }
    }
}

// ── ScoreManager ──────────────────────────────────────────────────────────────

/// Accumulates one agent's score over a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreManager {
    config:        ScoreConfig,
    breakdown:     ScoreBreakdown,
    deliveries:    u32,
    cancellations: u32,
    finalized:     bool,
}

impl ScoreManager {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Add the applied payout to income and the lateness-tier penalty.
    pub fn register_delivery(&mut self, job: &Job, outcome: &DeliveryOutcome) -> ScoreEvent {
        let tier = LatenessTier::from_lateness(outcome.lateness_seconds);
        let penalty = tier.penalty(&self.config);
        self.breakdown.base_income += outcome.payout_applied;
        self.breakdown.penalty_total += penalty;
        self.deliveries += 1;
        tracing::debug!(job = %job.id, income = outcome.payout_applied, penalty, "delivery scored");
        ScoreEvent::Delivery { job: job.id.clone(), income: outcome.payout_applied, tier, penalty }
    }

    pub fn register_cancellation(&mut self, job: &Job) -> ScoreEvent {
        let penalty = self.config.cancellation_penalty;
        self.breakdown.penalty_total += penalty;
        self.cancellations += 1;
        tracing::debug!(job = %job.id, penalty, "cancellation scored");
        ScoreEvent::Cancellation { job: job.id.clone(), penalty }
    }

    /// Award `max(0, time_left) × rate`.  A second call is an error and
    /// leaves the breakdown untouched.
    pub fn finalize(&mut self, time_left: f64, session_duration: f64) -> ScoreResult<ScoreBreakdown> {
        if self.finalized {
            return Err(ScoreError::AlreadyFinalized);
        }
        self.finalized = true;
        self.breakdown.time_bonus = time_left.max(0.0) * self.config.time_bonus_rate;
        tracing::info!(
            time_left,
            session_duration,
            bonus = self.breakdown.time_bonus,
            total = self.breakdown.total_points(),
            "score finalized"
        );
        Ok(self.breakdown)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        self.breakdown
    }

    pub fn total_points(&self) -> f64 {
        self.breakdown.total_points()
    }

    pub fn deliveries(&self) -> u32 {
        self.deliveries
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations
    }
}
