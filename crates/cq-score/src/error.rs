use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("score already finalized")]
    AlreadyFinalized,
}

pub type ScoreResult<T> = Result<T, ScoreError>;
