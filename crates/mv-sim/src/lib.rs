//! # mv-sim: Monte-Carlo RTP harness
//!
//! Plays large numbers of independent rounds against a [`GameConfig`] and
//! aggregates return-to-player, hit rate and the win-size distribution.
//!
//! ## Determinism
//!
//! Rounds are cut into fixed-size batches. Batch `i` draws from
//! `ChaCha8Rng::seed_from_u64(seed)` on stream `i`, keeps a private
//! accumulator, and the batch accumulators are merged in batch order. The same
//! seed and round count therefore give the same report whatever the worker
//! count.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mv_sim::{SimConfig, Simulator};
//! use mv_ways::GameConfig;
//!
//! let game = GameConfig::default();
//! let sim = Simulator::new(&game, SimConfig::default().with_seed(7))?;
//! let report = sim.run(1_000_000, 1.0)?;
//! println!("{}", report.summary());
//! ```
//!
//! [`GameConfig`]: mv_ways::GameConfig

pub mod accumulator;
pub mod config;
pub mod error;
pub mod harness;
pub mod report;

pub use accumulator::{HISTOGRAM_LABELS, PayoutEntry, SimAccumulator, WinHistogram};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use harness::{CancelHandle, Simulator};
pub use report::{HistogramBucket, SimReport};
