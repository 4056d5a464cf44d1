use crate::hal::Side;
use thiserror::Error;

/// Errors raised by the slalom control loop and its drivers
#[derive(Debug, Error)]
pub enum SlalomError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{side} scan arc produced no samples")]
    EmptyScan { side: Side },

    #[error("Approach aborted after {polls} polls without a reading within {stop_distance_cm} cm")]
    ApproachTimeout { polls: u64, stop_distance_cm: f64 },

    #[error("Hardware error: {0}")]
    Hardware(String),

    #[error("Scripted vehicle ran out of readings")]
    ScriptExhausted,

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type for slalom operations
pub type SlalomResult<T> = Result<T, SlalomError>;

impl SlalomError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn hardware(msg: impl Into<String>) -> Self {
        Self::Hardware(msg.into())
    }
}
