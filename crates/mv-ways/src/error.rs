//! Error types for the ways core

use thiserror::Error;

use crate::symbols::Symbol;

/// Construction and configuration errors.
///
/// Nothing in the per-spin path returns these; a generator, evaluator or
/// engine that was built successfully cannot fail mid-simulation.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Weighted distribution is empty")]
    EmptyDistribution,

    #[error("Invalid weight {weight} for symbol {symbol}")]
    InvalidWeight { symbol: Symbol, weight: u32 },

    #[error("Reel {reel} has {actual} rows, expected {expected}")]
    GridMismatch {
        reel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Board has no reels")]
    EmptyBoard,

    #[error("Reel strip {reel} is empty")]
    EmptyReelStrip { reel: usize },

    #[error("Expected {expected} reel strips, got {actual}")]
    ReelCountMismatch { expected: usize, actual: usize },

    #[error("Unknown symbol code: {0}")]
    UnknownSymbol(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
