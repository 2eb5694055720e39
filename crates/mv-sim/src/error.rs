//! Error types for the simulation harness

use mv_ways::SlotError;
use thiserror::Error;

/// Simulation errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Game configuration error: {0}")]
    Game(#[from] SlotError),

    #[error("Invalid simulation configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker pool could not be built: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;
