//! `SessionOutputObserver<W>`: bridges `SessionObserver` to an `OutputWriter`.

use cq_core::{AgentId, Tick};
use cq_score::ScoreEvent;
use cq_sim::{Session, SessionObserver, SessionStatus};

use crate::row::{AgentColumns, ScoreEventRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SessionObserver`] that writes one summary row per tick and one row
/// per score event to any [`OutputWriter`].
///
/// Observer hooks cannot fail, so the first write error is stored; check it
/// with [`take_error`][Self::take_error] after the run.
pub struct SessionOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SessionOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The stored write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush the writer; for runs that stop before a terminal status.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "output write failed");
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn columns(session: &Session, agent: AgentId) -> AgentColumns {
    let c = session.courier(agent);
    let pos = c.position();
    AgentColumns {
        x:          pos.x,
        y:          pos.y,
        stamina:    c.stamina(),
        reputation: c.reputation(),
        earned:     c.total_earned(),
        carrying:   c.inventory().len(),
    }
}

impl<W: OutputWriter> SessionObserver for SessionOutputObserver<W> {
    fn on_score_event(&mut self, tick: Tick, agent: AgentId, event: &ScoreEvent) {
        let row = ScoreEventRow {
            tick:   tick.0,
            agent,
            kind:   event.kind(),
            job:    event.job().unwrap_or_default().to_owned(),
            points: event.points_delta(),
        };
        let result = self.writer.write_score_event(&row);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, tick: Tick, session: &Session) {
        let weather = session.weather();
        let row = TickSummaryRow {
            tick:             tick.0,
            elapsed_secs:     session.clock().elapsed_secs(),
            weather:          weather.condition(),
            speed_multiplier: weather.speed_multiplier(),
            pool_jobs:        session.pool().len(),
            player:           columns(session, AgentId::Player),
            ai:               columns(session, AgentId::Ai),
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_session_end(&mut self, _tick: Tick, _status: &SessionStatus) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
