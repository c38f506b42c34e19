use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather config parse error: {0}")]
    Parse(String),

    #[error("invalid weather timing: {0}")]
    Timing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WeatherResult<T> = Result<T, WeatherError>;
