use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("unknown difficulty level {0} (expected 1, 2 or 3)")]
    UnknownDifficulty(u8),
}

pub type AiResult<T> = Result<T, AiError>;
