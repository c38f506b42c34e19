//! Session observer trait for output writers and progress reporting.

use cq_core::{AgentId, Tick};
use cq_score::ScoreEvent;

use crate::{Session, SessionStatus};

/// Callbacks invoked by [`Session::step`][crate::Session::step].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example
///
/// ```rust,ignore
/// struct Progress;
///
/// impl SessionObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, session: &Session) {
///         if tick.0 % 100 == 0 {
///             println!("{tick}: player {:.0}", session.courier(AgentId::Player).total_earned());
///         }
///     }
/// }
/// ```
pub trait SessionObserver {
    /// Called before any processing of `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// One score ledger entry.  Events from mutators called between ticks
    /// are reported at the end of the next tick.
    fn on_score_event(&mut self, _tick: Tick, _agent: AgentId, _event: &ScoreEvent) {}

    /// Called after `tick` completes; the session clock has already advanced.
    fn on_tick_end(&mut self, _tick: Tick, _session: &Session) {}

    /// Called once, on the tick the session reaches a terminal status.
    fn on_session_end(&mut self, _tick: Tick, _status: &SessionStatus) {}
}

/// A [`SessionObserver`] that does nothing.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}
