//! Integration tests for cq-sim.

use cq_agent::DefeatReason;
use cq_ai::Difficulty;
use cq_core::{AgentId, Direction, GridPos, Tick};
use cq_jobs::{DeadlineInput, JobRecord, JobResult, JobSource, StaticJobSource};
use cq_map::{GridMap, GridMapBuilder, TileInfo};
use cq_score::ScoreEvent;

use crate::{
    JobPool, NoopObserver, Session, SessionBuilder, SessionConfig, SessionError, SessionObserver,
    SessionStatus,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 10×5 streets with a 2×1 building at (4..=5, 2).
fn city(goal: f64) -> GridMap {
    GridMapBuilder::new()
        .legend("C", TileInfo::street("calle", 1.0))
        .legend("B", TileInfo::building("edificio"))
        .ascii_row("CCCCCCCCCC")
        .ascii_row("CCCCCCCCCC")
        .ascii_row("CCCCBBCCCC")
        .ascii_row("CCCCCCCCCC")
        .ascii_row("CCCCCCCCCC")
        .goal(goal)
        .build()
        .unwrap()
}

/// One-second ticks, 100 s session, no job loss.
fn config() -> SessionConfig {
    let mut c = SessionConfig {
        tick_duration_secs:    1.0,
        session_duration_secs: 100.0,
        ..SessionConfig::default()
    };
    c.job_loss.enabled = false;
    c
}

fn record(id: &str, pickup: (i32, i32), dropoff: (i32, i32), payout: f64) -> JobRecord {
    JobRecord {
        id:           id.into(),
        pickup,
        dropoff,
        payout,
        deadline:     DeadlineInput::Seconds(60.0),
        weight:       1.0,
        priority:     0,
        release_time: None,
    }
}

fn session_with(config: SessionConfig, goal: f64, records: Vec<JobRecord>) -> Session {
    SessionBuilder::new(config, city(goal))
        .job_source(StaticJobSource::new(records))
        .build()
        .unwrap()
}

fn session(records: Vec<JobRecord>) -> Session {
    session_with(config(), 0.0, records)
}

/// Counts callbacks and keeps every score event.
#[derive(Default)]
struct Recorder {
    starts: usize,
    ends:   usize,
    events: Vec<(AgentId, ScoreEvent)>,
    over:   Vec<SessionStatus>,
}

impl SessionObserver for Recorder {
    fn on_tick_start(&mut self, _tick: Tick) {
        self.starts += 1;
    }

    fn on_score_event(&mut self, _tick: Tick, agent: AgentId, event: &ScoreEvent) {
        self.events.push((agent, event.clone()));
    }

    fn on_tick_end(&mut self, _tick: Tick, _session: &Session) {
        self.ends += 1;
    }

    fn on_session_end(&mut self, _tick: Tick, status: &SessionStatus) {
        self.over.push(*status);
    }
}

/// Hands out pre-set batches, one per fetch, then nothing.
struct Batches {
    batches: Vec<Vec<JobRecord>>,
    fetches: usize,
}

impl JobSource for Batches {
    fn fetch(&mut self) -> JobResult<Vec<JobRecord>> {
        self.fetches += 1;
        if self.batches.is_empty() { Ok(Vec::new()) } else { Ok(self.batches.remove(0)) }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn default_starts_are_first_and_last_walkable() {
        let s = session(vec![]);
        assert_eq!(s.courier(AgentId::Player).position(), GridPos::new(0, 0));
        assert_eq!(s.courier(AgentId::Ai).position(), GridPos::new(9, 4));
        assert_eq!(s.status(), SessionStatus::Running);
        assert_eq!(s.planner().difficulty(), Difficulty::Greedy);
    }

    #[test]
    fn blocked_start_rejected() {
        let r = SessionBuilder::new(config(), city(0.0)).player_start(GridPos::new(4, 2)).build();
        assert!(matches!(r, Err(SessionError::Config(_))));
    }

    #[test]
    fn bad_timing_rejected() {
        let mut c = config();
        c.tick_duration_secs = 0.0;
        assert!(matches!(SessionBuilder::new(c, city(0.0)).build(), Err(SessionError::Config(_))));

        let mut c = config();
        c.weather.burst_min_secs = 20.0;
        assert!(matches!(SessionBuilder::new(c, city(0.0)).build(), Err(SessionError::Weather(_))));
    }

    #[test]
    fn first_batch_bound_to_epoch() {
        let mut c = config();
        c.epoch_secs = 1_000.0;
        let s = session_with(c, 0.0, vec![record("a", (1, 0), (5, 0), 10.0)]);
        let job = s.pool().get("a").unwrap();
        assert_eq!(job.deadline_timestamp(), Some(1_060.0));
        assert_eq!(s.now(), 1_000.0);
    }

    #[test]
    fn config_defaults_fill_partial_json() {
        let c: SessionConfig = serde_json::from_str(r#"{"seed": 7, "difficulty": 3}"#).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.difficulty, Difficulty::AStar);
        assert_eq!(c.interaction_radius, 3);
        assert_eq!(c.job_loss.range, 150);
        assert_eq!(c.courier.max_weight, 10.0);
        assert_eq!(c.total_ticks(), 6_000);
    }
}

// ── Player mutators ───────────────────────────────────────────────────────────

#[cfg(test)]
mod mutators {
    use super::*;

    #[test]
    fn move_validated_against_map() {
        let mut s = session_with(config(), 0.0, vec![]);
        assert!(s.attempt_move(AgentId::Player, Direction::Right));
        assert_eq!(s.courier(AgentId::Player).position(), GridPos::new(1, 0));
        assert!(!s.attempt_move(AgentId::Player, Direction::Up));
        assert_eq!(s.courier(AgentId::Player).position(), GridPos::new(1, 0));
    }

    #[test]
    fn pickup_needs_range() {
        let mut s = session(vec![record("a", (5, 0), (9, 0), 10.0)]);
        assert!(!s.attempt_pickup(AgentId::Player, "a").unwrap());
        for _ in 0..2 {
            s.attempt_move(AgentId::Player, Direction::Right);
        }
        assert!(s.attempt_pickup(AgentId::Player, "a").unwrap());
        assert!(s.courier(AgentId::Player).holds("a"));
        assert_eq!(s.courier(AgentId::Player).inventory().get("a").unwrap().owner, Some(AgentId::Player));
        assert!(!s.pool().contains("a"));
    }

    #[test]
    fn pickup_unknown_id_is_error() {
        let mut s = session(vec![]);
        assert!(matches!(
            s.attempt_pickup(AgentId::Player, "ghost"),
            Err(SessionError::UnknownJob { agent: AgentId::Player, .. })
        ));
    }

    #[test]
    fn release_time_gates_pickup() {
        let mut rec = record("later", (0, 0), (5, 0), 10.0);
        rec.release_time = Some(5.0);
        let mut s = session(vec![rec]);
        assert!(!s.attempt_pickup(AgentId::Player, "later").unwrap());
        s.run_ticks(5, &mut NoopObserver).unwrap();
        assert!(s.attempt_pickup(AgentId::Player, "later").unwrap());
    }

    #[test]
    fn deliver_in_range_scores() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 100.0)]);
        assert!(s.attempt_pickup(AgentId::Player, "a").unwrap());
        assert_eq!(s.attempt_deliver(AgentId::Player, "a").unwrap(), None);

        for _ in 0..3 {
            s.attempt_move(AgentId::Player, Direction::Right);
        }
        let outcome = s.attempt_deliver(AgentId::Player, "a").unwrap().unwrap();
        assert_eq!(outcome.payout_applied, 100.0);
        assert!(!outcome.was_late);
        assert_eq!(s.courier(AgentId::Player).total_earned(), 100.0);
        assert_eq!(s.score(AgentId::Player).breakdown().base_income, 100.0);

        // Queued event is reported on the next tick.
        let mut rec = Recorder::default();
        s.step(&mut rec).unwrap();
        assert!(matches!(rec.events.as_slice(), [(AgentId::Player, ScoreEvent::Delivery { .. })]));
    }

    #[test]
    fn deliver_unheld_is_error() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 100.0)]);
        assert!(matches!(s.attempt_deliver(AgentId::Player, "a"), Err(SessionError::UnknownJob { .. })));
    }

    #[test]
    fn cancel_returns_job_and_charges() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 100.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();
        let ev = s.attempt_cancel(AgentId::Player, "a").unwrap().unwrap();
        assert_eq!(ev, ScoreEvent::Cancellation { job: "a".into(), penalty: 75.0 });

        let p = s.courier(AgentId::Player);
        assert_eq!(p.reputation(), 64);
        assert!(!p.holds("a"));
        assert_eq!(s.pool().get("a").unwrap().owner, None);
        assert_eq!(s.score(AgentId::Player).breakdown().penalty_total, 75.0);

        assert!(matches!(s.attempt_cancel(AgentId::Player, "a"), Err(SessionError::UnknownJob { .. })));
    }

    #[test]
    fn nearest_job_within_radius() {
        let s = session(vec![record("far", (5, 0), (9, 0), 1.0), record("near", (2, 0), (9, 0), 1.0)]);
        let hit = s.nearest_job(AgentId::Player, 3.0).unwrap();
        assert_eq!(hit.job.id, "near");
        assert!(!hit.delivery);
        assert_eq!(hit.distance, 2.0);
        assert!(s.nearest_job(AgentId::Player, 1.0).is_none());
    }

    #[test]
    fn nearest_job_prefers_delivery_on_tie() {
        let mut s = session(vec![record("held", (0, 0), (0, 2), 1.0), record("pool", (2, 0), (9, 0), 1.0)]);
        s.attempt_pickup(AgentId::Player, "held").unwrap();
        let hit = s.nearest_job(AgentId::Player, 5.0).unwrap();
        assert_eq!(hit.job.id, "held");
        assert!(hit.delivery);
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick_loop {
    use super::*;

    #[test]
    fn stationary_couriers_recover() {
        let mut s = session(vec![]);
        s.attempt_move(AgentId::Player, Direction::Right);
        assert_eq!(s.courier(AgentId::Player).stamina(), 99.5);

        s.step(&mut NoopObserver).unwrap();
        assert_eq!(s.courier(AgentId::Player).stamina(), 99.5, "moved this tick");
        s.step(&mut NoopObserver).unwrap();
        assert_eq!(s.courier(AgentId::Player).stamina(), 100.0);
    }

    #[test]
    fn time_up_finalizes_once() {
        let mut c = config();
        c.session_duration_secs = 5.0;
        let mut s = session_with(c, 0.0, vec![]);
        let mut rec = Recorder::default();
        assert_eq!(s.run(&mut rec).unwrap(), SessionStatus::TimeUp);

        assert_eq!(s.current_tick(), Tick(5));
        assert_eq!((rec.starts, rec.ends), (5, 5));
        assert_eq!(rec.over, vec![SessionStatus::TimeUp]);
        let finals = rec.events.iter().filter(|(_, e)| matches!(e, ScoreEvent::Finalized { .. })).count();
        assert_eq!(finals, 2);
        assert!(s.score(AgentId::Player).is_finalized());
        assert!(s.score(AgentId::Ai).is_finalized());

        // Finished sessions ignore further steps and actions.
        s.step(&mut rec).unwrap();
        assert_eq!(s.current_tick(), Tick(5));
        assert!(!s.attempt_move(AgentId::Player, Direction::Right));
    }

    #[test]
    fn reaching_goal_is_victory_with_time_bonus() {
        let mut s = session_with(config(), 100.0, vec![record("a", (0, 0), (2, 0), 100.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();
        s.attempt_deliver(AgentId::Player, "a").unwrap().unwrap();

        let status = s.step(&mut NoopObserver).unwrap();
        assert_eq!(status, SessionStatus::Victory { agent: AgentId::Player });
        let b = s.score(AgentId::Player).breakdown();
        assert!((b.time_bonus - 99.0 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn low_reputation_is_defeat() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 100.0)]);
        for _ in 0..9 {
            assert!(s.attempt_pickup(AgentId::Player, "a").unwrap());
            s.attempt_cancel(AgentId::Player, "a").unwrap();
        }
        assert_eq!(s.courier(AgentId::Player).reputation(), 16);
        let status = s.step(&mut NoopObserver).unwrap();
        assert_eq!(status, SessionStatus::Defeat { agent: AgentId::Player, reason: DefeatReason::Reputation });
    }

    #[test]
    fn pool_refills_when_everyone_idle() {
        let source = Batches {
            batches: vec![
                vec![record("a", (0, 0), (2, 0), 10.0)],
                vec![record("a", (0, 0), (2, 0), 10.0), record("b", (1, 1), (3, 3), 10.0)],
            ],
            fetches: 0,
        };
        let mut s = SessionBuilder::new(config(), city(0.0)).job_source(source).build().unwrap();
        assert_eq!(s.pool().len(), 1);

        s.attempt_pickup(AgentId::Player, "a").unwrap();
        s.attempt_deliver(AgentId::Player, "a").unwrap();
        s.step(&mut NoopObserver).unwrap();

        assert!(s.pool().contains("a"), "delivered id is back in circulation");
        assert!(s.pool().contains("b"));
        assert_eq!(s.pool().get("a").unwrap().owner, None);
    }

    #[test]
    fn static_source_keeps_supplying_jobs() {
        let mut s = session(vec![record("a", (0, 0), (2, 0), 10.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();
        s.attempt_deliver(AgentId::Player, "a").unwrap().unwrap();
        assert!(s.pool().is_empty());

        // The AI starts 13 cells away, too far to reach the pickup in time.
        s.run_ticks(5, &mut NoopObserver).unwrap();
        assert!(s.pool().contains("a"));

        assert!(s.attempt_pickup(AgentId::Player, "a").unwrap());
        s.attempt_deliver(AgentId::Player, "a").unwrap().unwrap();
        assert_eq!(s.courier(AgentId::Player).total_earned(), 20.0);
        assert_eq!(s.courier(AgentId::Player).delivered().len(), 2);
    }

    #[test]
    fn no_refill_while_a_job_is_carried() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 10.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();
        s.run_ticks(3, &mut NoopObserver).unwrap();
        assert!(s.pool().is_empty());
        assert!(s.courier(AgentId::Player).holds("a"));
    }

    #[test]
    fn job_loss_hits_either_agent() {
        let mut c = config();
        c.job_loss.enabled = true;
        c.job_loss.range = 0;
        let mut s = session_with(c, 0.0, vec![record("a", (0, 0), (6, 0), 100.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();

        let mut rec = Recorder::default();
        s.step(&mut rec).unwrap();
        let p = s.courier(AgentId::Player);
        assert!(!p.holds("a"));
        assert_eq!(p.reputation(), 64);
        assert!(s.pool().contains("a") || s.courier(AgentId::Ai).holds("a"));
        assert!(matches!(
            rec.events.as_slice(),
            [(AgentId::Player, ScoreEvent::Cancellation { penalty, .. })] if *penalty == 75.0
        ));
    }

    #[test]
    fn ai_picks_up_and_delivers() {
        let mut c = config();
        c.difficulty = Difficulty::AStar;
        let source = Batches { batches: vec![vec![record("a", (9, 4), (2, 4), 50.0)]], fetches: 0 };
        let mut s = SessionBuilder::new(c, city(0.0)).job_source(source).build().unwrap();

        s.step(&mut NoopObserver).unwrap();
        assert!(s.courier(AgentId::Ai).holds("a"));

        s.run_ticks(30, &mut NoopObserver).unwrap();
        let ai = s.courier(AgentId::Ai);
        assert_eq!(ai.delivered().len(), 1);
        assert_eq!(ai.total_earned(), 50.0);
        assert_eq!(s.score(AgentId::Ai).deliveries(), 1);
    }

    #[test]
    fn player_cannot_take_ai_job() {
        let mut s = session(vec![record("a", (9, 4), (0, 4), 50.0)]);
        s.step(&mut NoopObserver).unwrap();
        assert!(s.courier(AgentId::Ai).holds("a"));
        assert!(!s.attempt_pickup(AgentId::Player, "a").unwrap());
        assert!(matches!(s.attempt_deliver(AgentId::Player, "a"), Err(SessionError::UnknownJob { .. })));
    }
}

// ── Pool ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use super::*;

    #[test]
    fn refill_skips_invalid_and_circulating() {
        let mut pool = JobPool::new();
        let mut bad = record("bad", (0, 0), (1, 1), 1.0);
        bad.weight = 0.0;
        assert_eq!(pool.refill(vec![record("a", (0, 0), (1, 1), 1.0), bad], 0.0, |_| false), 1);
        assert!(!pool.contains("bad"));

        // Still lying in the pool.
        assert_eq!(pool.refill(vec![record("a", (0, 0), (1, 1), 1.0)], 0.0, |_| false), 0);
        assert_eq!(pool.len(), 1);

        // Carried by a courier.
        let _carried = pool.take("a").unwrap();
        assert_eq!(pool.refill(vec![record("a", (0, 0), (1, 1), 1.0)], 0.0, |id| id == "a"), 0);
        assert!(pool.is_empty());

        // Delivered: out of circulation, so it may return.
        assert_eq!(pool.refill(vec![record("a", (0, 0), (1, 1), 1.0)], 0.0, |_| false), 1);
        assert!(pool.contains("a"));
    }

    #[test]
    fn pool_json_rebuilds_membership() {
        let mut pool = JobPool::new();
        pool.refill(vec![record("a", (0, 0), (1, 1), 1.0)], 0.0, |_| false);
        let back: JobPool = serde_json::from_str(&serde_json::to_string(&pool).unwrap()).unwrap();
        assert!(back.contains("a"));
        assert_eq!(back.get("a").unwrap().deadline_timestamp(), Some(60.0));
    }

    #[test]
    fn take_and_put_back() {
        let mut pool = JobPool::new();
        pool.refill(vec![record("a", (0, 0), (1, 1), 1.0), record("b", (0, 0), (1, 1), 1.0)], 0.0, |_| false);
        let mut a = pool.take("a").unwrap();
        assert_eq!(pool.as_slice()[0].id, "b");
        a.owner = Some(AgentId::Ai);
        pool.put_back(a);
        assert_eq!(pool.get("a").unwrap().owner, None);
        assert_eq!(pool.len(), 2);
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod snapshot {
    use super::*;

    #[test]
    fn json_round_trip_resumes() {
        let mut s = session(vec![record("a", (0, 0), (6, 0), 100.0), record("b", (8, 0), (8, 4), 30.0)]);
        s.attempt_pickup(AgentId::Player, "a").unwrap();
        s.attempt_move(AgentId::Player, Direction::Right);
        s.run_ticks(4, &mut NoopObserver).unwrap();

        let json = serde_json::to_string(&s.snapshot()).unwrap();
        let snap = serde_json::from_str(&json).unwrap();
        let mut r = SessionBuilder::from_snapshot(snap, StaticJobSource::default()).unwrap();

        assert_eq!(r.current_tick(), s.current_tick());
        assert_eq!(r.now(), s.now());
        for agent in AgentId::ALL {
            assert_eq!(r.courier(agent).position(), s.courier(agent).position());
            assert_eq!(r.courier(agent).stamina(), s.courier(agent).stamina());
            assert_eq!(r.courier(agent).reputation(), s.courier(agent).reputation());
            assert_eq!(r.score(agent).breakdown(), s.score(agent).breakdown());
        }
        assert!(r.courier(AgentId::Player).holds("a"));
        assert_eq!(r.pool().len(), s.pool().len());
        assert_eq!(r.weather().condition(), s.weather().condition());
        assert_eq!(r.weather().is_transitioning(), s.weather().is_transitioning());
        assert!((r.weather_info().time_remaining - s.weather_info().time_remaining).abs() < 1e-9);
        assert_eq!(r.map().width(), 10);
        assert!(r.map().is_blocked(GridPos::new(4, 2)));
        assert_eq!(r.planner(), s.planner());

        r.step(&mut NoopObserver).unwrap();
        assert_eq!(r.current_tick(), Tick(5));
    }
}
