//! Fluent builder for constructing a [`Session`].

use cq_agent::Courier;
use cq_ai::AiPlanner;
use cq_core::{AgentId, AgentRng, GridPos, SessionClock, SimRng};
use cq_jobs::{JobSource, StaticJobSource};
use cq_map::GridMap;
use cq_score::ScoreManager;
use cq_weather::{WeatherConfig, WeatherSimulator};

use crate::session::AgentSlot;
use crate::{JobPool, Session, SessionConfig, SessionError, SessionResult, SessionSnapshot, SessionStatus};

/// Fluent builder for [`Session`].
///
/// # Required inputs
///
/// - [`SessionConfig`]: seed, timing, difficulty, nested component configs
/// - [`GridMap`]: the city
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                              |
/// |----------------------|--------------------------------------|
/// | `.job_source(s)`     | empty `StaticJobSource`              |
/// | `.weather(w)`        | `WeatherConfig::default()` (clear, no transitions) |
/// | `.player_start(p)`   | first walkable cell in row order     |
/// | `.ai_start(p)`       | last walkable cell in row order      |
///
/// # Example
///
/// ```rust,ignore
/// let mut session = SessionBuilder::new(config, map)
///     .job_source(StaticJobSource::new(records))
///     .weather(weather)
///     .build()?;
/// session.run(&mut NoopObserver)?;
/// ```
pub struct SessionBuilder {
    config:       SessionConfig,
    map:          GridMap,
    source:       Option<Box<dyn JobSource>>,
    weather:      Option<WeatherConfig>,
    player_start: Option<GridPos>,
    ai_start:     Option<GridPos>,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig, map: GridMap) -> Self {
        Self {
            config,
            map,
            source:       None,
            weather:      None,
            player_start: None,
            ai_start:     None,
        }
    }

    /// Supplier of job batches.  Fetched once at build and again whenever
    /// the session runs out of work.
    pub fn job_source(mut self, source: impl JobSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn weather(mut self, weather: WeatherConfig) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn player_start(mut self, pos: GridPos) -> Self {
        self.player_start = Some(pos);
        self
    }

    pub fn ai_start(mut self, pos: GridPos) -> Self {
        self.ai_start = Some(pos);
        self
    }

    /// Validate inputs, fetch the first job batch, and return a session at
    /// tick 0.
    pub fn build(self) -> SessionResult<Session> {
        let config = self.config;
        config.validate()?;
        let map = self.map;

        // ── Resolve start cells ───────────────────────────────────────────
        let player_start = match self.player_start {
            Some(p) => p,
            None => map.walkable_cells().next().ok_or_else(no_walkable)?,
        };
        let ai_start = match self.ai_start {
            Some(p) => p,
            None => map.walkable_cells().last().ok_or_else(no_walkable)?,
        };
        for (agent, pos) in [(AgentId::Player, player_start), (AgentId::Ai, ai_start)] {
            if !map.is_walkable(pos) {
                return Err(SessionError::Config(format!("{agent} start {pos} is not walkable")));
            }
        }

        // ── Clock, weather, agents ────────────────────────────────────────
        let clock = SessionClock::new(config.epoch_secs, config.tick_duration_secs);
        let weather = WeatherSimulator::new(
            self.weather.unwrap_or_default(),
            config.weather.clone(),
            clock.now(),
            SimRng::new(config.seed),
        );
        let slot = |agent: AgentId, pos: GridPos| AgentSlot {
            courier:       Courier::new(agent, pos, config.courier.clone()),
            rng:           AgentRng::new(config.seed, agent),
            score:         ScoreManager::new(config.score.clone()),
            last_position: pos,
        };
        let agents = [slot(AgentId::Player, player_start), slot(AgentId::Ai, ai_start)];

        // ── First job batch ───────────────────────────────────────────────
        let mut source = self.source.unwrap_or_else(|| Box::new(StaticJobSource::default()));
        let mut pool = JobPool::new();
        let added = pool.refill(source.fetch()?, clock.epoch_secs, |_| false);

        tracing::info!(
            width = map.width(),
            height = map.height(),
            jobs = added,
            difficulty = %config.difficulty,
            seed = config.seed,
            "session built"
        );

        Ok(Session {
            planner: AiPlanner::new(config.difficulty, config.planner.history_len),
            clock,
            map,
            pool,
            source,
            weather,
            agents,
            status:  SessionStatus::Running,
            pending: Vec::new(),
            config,
        })
    }

    /// Rebuild a session from a snapshot.
    ///
    /// RNG streams are reseeded from `(seed, tick)`, so a resumed session is
    /// deterministic but does not replay the draws an uninterrupted run would
    /// have made.
    pub fn from_snapshot(snapshot: SessionSnapshot, source: impl JobSource + 'static) -> SessionResult<Session> {
        let SessionSnapshot {
            config,
            clock,
            map,
            player,
            ai,
            pool,
            weather_config,
            weather,
            planner,
            status,
            pending,
        } = snapshot;
        config.validate()?;
        let map = map.into_map()?;
        let tick = clock.current_tick;
        let seed = config.seed;

        let weather = WeatherSimulator::restore(
            weather_config,
            config.weather.clone(),
            weather,
            SimRng::resumed(seed, tick),
        );
        let agents = [player, ai].map(|a| AgentSlot {
            rng:           AgentRng::resumed(seed, a.courier.id(), tick),
            last_position: a.last_position,
            score:         a.score,
            courier:       a.courier,
        });
        tracing::info!(tick = tick.0, %status, "session restored");

        Ok(Session {
            config,
            clock,
            map,
            pool,
            source: Box::new(source),
            weather,
            agents,
            planner,
            status,
            pending,
        })
    }
}

fn no_walkable() -> SessionError {
    SessionError::Config("map has no walkable cell".into())
}
