use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job record parse error: {0}")]
    Parse(String),

    #[error("job source returned no job list")]
    NoJobList,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type JobResult<T> = Result<T, JobError>;
