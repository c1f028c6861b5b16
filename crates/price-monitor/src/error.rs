//! Price monitoring errors

use aegis_core::Timestamp;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("No range provider supplied")]
    MissingRangeProvider,

    #[error("Price monitoring settings carry no parameters")]
    MissingParameters,

    #[error("Invalid price monitoring settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid trigger #{index}: {reason}")]
    InvalidTrigger { index: usize, reason: String },

    #[error("Received a time ({received}) that's before the last received time ({last})")]
    TimeSequence { last: Timestamp, received: Timestamp },

    #[error("Price monitoring auction with no end time")]
    ExpiresAtNotSet,

    #[error("Snapshot does not match the configured triggers: {0}")]
    SnapshotMismatch(String),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(String),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
