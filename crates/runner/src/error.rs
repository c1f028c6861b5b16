use aegis_price_monitor::MonitorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Price monitoring failed: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("Simulation task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
