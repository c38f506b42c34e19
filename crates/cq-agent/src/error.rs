use thiserror::Error;

use cq_core::AgentId;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("{agent} does not hold job {job:?}")]
    JobNotHeld { agent: AgentId, job: String },
}

pub type AgentResult<T> = Result<T, AgentError>;
