//! The weather state machine.

use serde::{Deserialize, Serialize};

use cq_core::{SimRng, WeatherCondition};

use crate::{WeatherConfig, WeatherTiming};

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Steady or mid-transition; never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
enum Phase {
    Steady,
    Transitioning {
        started_at:        f64,
        start_intensity:   f64,
        start_multiplier:  f64,
        target_condition:  WeatherCondition,
        target_intensity:  f64,
        target_multiplier: f64,
    },
}

/// Everything needed to resume the simulator where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition:           WeatherCondition,
    pub intensity:           f64,
    pub speed_multiplier:    f64,
    pub burst_start:         f64,
    pub burst_duration:      f64,
    pub transition_duration: f64,
    phase:                   Phase,
}

/// Result of one [`WeatherSimulator::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherUpdate {
    pub condition:        WeatherCondition,
    pub intensity:        f64,
    pub speed_multiplier: f64,
    /// `true` on the tick a transition started.
    pub changed:          bool,
}

/// Read-only summary for HUDs and logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub condition:           WeatherCondition,
    pub intensity:           f64,
    pub speed_multiplier:    f64,
    pub is_transitioning:    bool,
    /// Seconds left in the current burst, floored at 0.
    pub time_remaining:      f64,
    /// `0.0` when steady.
    pub transition_progress: f64,
}

// ── WeatherSimulator ──────────────────────────────────────────────────────────

/// Markov weather process driven by an injected clock.
///
/// Call [`update`](Self::update) once per tick with the session time.
#[derive(Debug, Clone)]
pub struct WeatherSimulator {
    config: WeatherConfig,
    timing: WeatherTiming,
    rng:    SimRng,
    state:  WeatherSnapshot,
}

impl WeatherSimulator {
    /// Start in the provider's initial condition at time `now`.
    pub fn new(config: WeatherConfig, timing: WeatherTiming, now: f64, mut rng: SimRng) -> Self {
        let condition = config.initial.condition;
        let burst_duration = draw(&mut rng, timing.burst_min_secs, timing.burst_max_secs);
        let transition_duration = draw(&mut rng, timing.transition_min_secs, timing.transition_max_secs);
        tracing::info!(
            city = %config.city,
            %condition,
            burst_secs = burst_duration,
            "weather simulator started"
        );
        Self {
            state: WeatherSnapshot {
                condition,
                intensity: config.initial.intensity.clamp(0.0, 1.0),
                speed_multiplier: condition.base_speed_multiplier(),
                burst_start: now,
                burst_duration,
                transition_duration,
                phase: Phase::Steady,
            },
            config,
            timing,
            rng,
        }
    }

    /// Resume from a snapshot with a fresh RNG stream.
    pub fn restore(config: WeatherConfig, timing: WeatherTiming, snapshot: WeatherSnapshot, rng: SimRng) -> Self {
        Self { config, timing, rng, state: snapshot }
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        self.state.clone()
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    pub fn timing(&self) -> &WeatherTiming {
        &self.timing
    }

    pub fn condition(&self) -> WeatherCondition {
        self.state.condition
    }

    pub fn intensity(&self) -> f64 {
        self.state.intensity
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.state.speed_multiplier
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state.phase, Phase::Transitioning { .. })
    }

    /// Target of the running transition.
    pub fn target(&self) -> Option<WeatherCondition> {
        match self.state.phase {
            Phase::Transitioning { target_condition, .. } => Some(target_condition),
            Phase::Steady => None,
        }
    }

    /// Advance to `now`: start a transition when the burst has run out,
    /// interpolate a running one, and complete it once its timer expires.
    pub fn update(&mut self, now: f64) -> WeatherUpdate {
        let mut changed = false;
        if !self.is_transitioning() && now - self.state.burst_start >= self.state.burst_duration {
            self.start_transition(now);
            changed = true;
        }

        if let Phase::Transitioning {
            started_at,
            start_intensity,
            start_multiplier,
            target_intensity,
            target_multiplier,
            ..
        } = self.state.phase
        {
            let progress = self.progress_at(started_at, now);
            self.state.speed_multiplier = lerp(start_multiplier, target_multiplier, progress);
            self.state.intensity = lerp(start_intensity, target_intensity, progress);
            tracing::debug!(progress, multiplier = self.state.speed_multiplier, "weather interpolating");
            if progress >= 1.0 {
                self.complete_transition(now);
            }
        }

        WeatherUpdate {
            condition:        self.state.condition,
            intensity:        self.state.intensity,
            speed_multiplier: self.state.speed_multiplier,
            changed,
        }
    }

    pub fn info(&self, now: f64) -> WeatherInfo {
        let s = &self.state;
        let transition_progress = match s.phase {
            Phase::Transitioning { started_at, .. } => self.progress_at(started_at, now),
            Phase::Steady => 0.0,
        };
        WeatherInfo {
            condition: s.condition,
            intensity: s.intensity,
            speed_multiplier: s.speed_multiplier,
            is_transitioning: self.is_transitioning(),
            time_remaining: (s.burst_duration - (now - s.burst_start)).max(0.0),
            transition_progress,
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn progress_at(&self, started_at: f64, now: f64) -> f64 {
        if self.state.transition_duration <= 0.0 {
            return 1.0;
        }
        ((now - started_at) / self.state.transition_duration).clamp(0.0, 1.0)
    }

    /// Markov draw from the current row; an empty or missing row keeps the
    /// current condition.
    fn next_condition(&mut self) -> WeatherCondition {
        let current = self.state.condition;
        let Some(row) = self.config.row(current).filter(|r| !r.is_empty()) else {
            tracing::warn!(%current, "no transition row, weather stays");
            return current;
        };
        let r: f64 = self.rng.random();
        row.sample(r).unwrap_or(current)
    }

    fn start_transition(&mut self, now: f64) {
        let target_condition = self.next_condition();
        let (lo, hi) = target_condition.intensity_range();
        let target_intensity = draw(&mut self.rng, lo, hi);
        tracing::info!(
            from = %self.state.condition,
            to = %target_condition,
            secs = self.state.transition_duration,
            "weather transition started"
        );
        self.state.phase = Phase::Transitioning {
            started_at: now,
            start_intensity: self.state.intensity,
            start_multiplier: self.state.speed_multiplier,
            target_condition,
            target_intensity,
            target_multiplier: target_condition.base_speed_multiplier(),
        };
    }

    fn complete_transition(&mut self, now: f64) {
        let Phase::Transitioning { target_condition, target_intensity, target_multiplier, .. } =
            self.state.phase
        else {
            return;
        };
        let s = &mut self.state;
        s.condition = target_condition;
        s.intensity = target_intensity;
        s.speed_multiplier = target_multiplier;
        s.phase = Phase::Steady;
        s.burst_start = now;
        s.burst_duration = draw(&mut self.rng, self.timing.burst_min_secs, self.timing.burst_max_secs);
        s.transition_duration =
            draw(&mut self.rng, self.timing.transition_min_secs, self.timing.transition_max_secs);
        tracing::info!(
            condition = %s.condition,
            multiplier = s.speed_multiplier,
            burst_secs = s.burst_duration,
            "weather transition completed"
        );
    }
}

fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Uniform in `[lo, hi]`; `lo` when the range is empty or inverted.
fn draw(rng: &mut SimRng, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.gen_range(lo..=hi) } else { lo }
}
