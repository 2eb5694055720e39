//! # mv-stage: Meta Vault event schema
//!
//! Defines the events the math core hands to the frontend event bus.
//! The core never talks to the bus directly; it only records events
//! into an [`EventBook`] that the caller drains after each round.
//!
//! ## Wire format
//!
//! Every event is a flat JSON object tagged by `type`:
//!
//! ```text
//! {"type":"spinResult","reels":[["H1","2X",...],...],"wins":[...],"totalWin":1.5,"collectorCount":0}
//! {"type":"symbolTransformation","threshold":4,"transformation":"H4_TO_H1","positions":[[0,1]]}
//! {"type":"collectorCollection","previousCount":3,"newCount":5,"collected":2,"positions":[[1,0],[4,3]]}
//! ```
//!
//! Symbols travel as their short code strings. Payout numbers that cannot be
//! represented as JSON numbers degrade to their string form instead of failing.

pub mod book;
pub mod codec;
pub mod event;

pub use book::*;
pub use codec::*;
pub use event::*;

use thiserror::Error;

/// Errors raised while decoding events
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Malformed event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown event type: {0}")]
    UnknownType(String),
}

/// Result type alias
pub type StageResult<T> = std::result::Result<T, StageError>;
