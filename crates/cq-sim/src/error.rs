use thiserror::Error;

use cq_agent::AgentError;
use cq_core::AgentId;
use cq_jobs::JobError;
use cq_map::MapError;
use cq_score::ScoreError;
use cq_weather::WeatherError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session configuration error: {0}")]
    Config(String),

    #[error("{agent}: no job {job:?} in circulation")]
    UnknownJob { agent: AgentId, job: String },

    #[error("map error: {0}")]
    Map(#[from] MapError),

    #[error("job source error: {0}")]
    Jobs(#[from] JobError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("score error: {0}")]
    Score(#[from] ScoreError),

    #[error("weather error: {0}")]
    Weather(#[from] WeatherError),
}

pub type SessionResult<T> = Result<T, SessionError>;
