//! Save/resume state.

use serde::{Deserialize, Serialize};

use cq_agent::Courier;
use cq_ai::AiPlanner;
use cq_core::{AgentId, GridPos, SessionClock};
use cq_map::MapRecord;
use cq_score::{ScoreEvent, ScoreManager};
use cq_weather::{WeatherConfig, WeatherSnapshot};

use crate::session::AgentSlot;
use crate::{JobPool, Session, SessionConfig, SessionStatus};

/// One courier and its ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub courier:       Courier,
    pub score:         ScoreManager,
    pub last_position: GridPos,
}

/// Everything needed to resume a session, minus the job source and RNG
/// state.  Restore with [`SessionBuilder::from_snapshot`][crate::SessionBuilder::from_snapshot].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub config:         SessionConfig,
    pub clock:          SessionClock,
    pub map:            MapRecord,
    pub player:         AgentSnapshot,
    pub ai:             AgentSnapshot,
    pub pool:           JobPool,
    pub weather_config: WeatherConfig,
    pub weather:        WeatherSnapshot,
    pub planner:        AiPlanner,
    pub status:         SessionStatus,
    /// Score events recorded since the last tick.
    #[serde(default)]
    pub pending:        Vec<(AgentId, ScoreEvent)>,
}

impl AgentSnapshot {
    fn of(slot: &AgentSlot) -> Self {
        Self {
            courier:       slot.courier.clone(),
            score:         slot.score.clone(),
            last_position: slot.last_position,
        }
    }
}

impl Session {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            config:         self.config.clone(),
            clock:          self.clock.clone(),
            map:            self.map.to_record(),
            player:         AgentSnapshot::of(&self.agents[AgentId::Player.index()]),
            ai:             AgentSnapshot::of(&self.agents[AgentId::Ai.index()]),
            pool:           self.pool.clone(),
            weather_config: self.weather.config().clone(),
            weather:        self.weather.snapshot(),
            planner:        self.planner.clone(),
            status:         self.status,
            pending:        self.pending.clone(),
        }
    }
}
