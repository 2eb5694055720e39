//! # mv-ways: Meta Vault 1024-ways math core
//!
//! Deterministic math for a 5×4 ways slot with multiplier wilds and a
//! collector-driven symbol upgrade feature.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (built once, passed by reference)
//!     │
//!     ├── BoardGenerator ── weighted draw / reel-strip window
//!     ├── WaysEvaluator ─── paytable + wild rules → Vec<WayWin>
//!     └── SpinEngine
//!           │
//!           ├── base spin ─────────────────────────────┐
//!           └── bonus session (strictly sequential)    │
//!                 draw → CollectorFeature (scan, fire  │
//!                 thresholds, transform) → evaluate →  │
//!                 boost top tier → retrigger / win cap │
//!                                                      v
//!                                   RoundResult + EventBook
//! ```
//!
//! Every source of randomness is an explicitly passed `Rng`, so a seed and a
//! configuration fully determine a round.

pub mod board;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod generator;
pub mod paytable;
pub mod spin;
pub mod symbols;
pub mod ways;

pub use board::*;
pub use collector::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use feature::*;
pub use generator::*;
pub use paytable::*;
pub use spin::*;
pub use symbols::*;
pub use ways::*;
