//! Session time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to session seconds is held in `SessionClock`:
//!
//!   now = epoch_secs + tick * tick_duration_secs
//!
//! Every job deadline and every weather timer is expressed in the same
//! absolute-seconds scale, so the driver can inject any epoch (wall clock,
//! zero, a restored snapshot's epoch) and the core never reads the system
//! clock itself.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute session tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed from `earlier` to `self` (saturating).
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SessionClock ──────────────────────────────────────────────────────────────

/// Converts tick counts into absolute session seconds.
///
/// The epoch is the single value every `Job::bind_session_start` call uses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionClock {
    /// Absolute seconds at tick 0 (the session-start epoch).
    pub epoch_secs: f64,
    /// Seconds one tick represents.
    pub tick_duration_secs: f64,
    /// The current tick, advanced by [`SessionClock::advance`].
    pub current_tick: Tick,
}

impl SessionClock {
    pub fn new(epoch_secs: f64, tick_duration_secs: f64) -> Self {
        Self {
            epoch_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Seconds elapsed since the epoch.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_duration_secs
    }

    /// Absolute time of the current tick.
    #[inline]
    pub fn now(&self) -> f64 {
        self.epoch_secs + self.elapsed_secs()
    }

    /// Seconds left before `session_duration_secs` runs out, floored at 0.
    pub fn time_left(&self, session_duration_secs: f64) -> f64 {
        (session_duration_secs - self.elapsed_secs()).max(0.0)
    }

    /// How many ticks span `secs` seconds (rounded up).
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        if self.tick_duration_secs <= 0.0 {
            return 0;
        }
        (secs / self.tick_duration_secs).ceil().max(0.0) as u64
    }

    /// Elapsed time as `(minutes, seconds)` for HUD-style logging.
    pub fn elapsed_ms(&self) -> (u64, u32) {
        let total = self.elapsed_secs().max(0.0) as u64;
        (total / 60, (total % 60) as u32)
    }
}

impl fmt::Display for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (m, s) = self.elapsed_ms();
        write!(f, "{} ({:02}:{:02})", self.current_tick, m, s)
    }
}
