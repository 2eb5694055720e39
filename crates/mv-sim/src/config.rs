//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Rounds to play
    pub spins: u64,

    /// Stake per round
    pub bet: f64,

    /// Random seed for reproducibility (None = random, recorded in the report)
    pub seed: Option<u64>,

    /// Worker threads (0 = one per CPU)
    pub workers: usize,

    /// Rounds per batch; each batch owns one random stream
    pub batch_size: u64,

    /// Keep a per-round payout log
    pub keep_payout_log: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spins: 100_000,
            bet: 1.0,
            seed: None,
            workers: 0,
            batch_size: 10_000,
            keep_payout_log: false,
        }
    }
}

impl SimConfig {
    /// Small, seeded run for tests
    pub fn quick() -> Self {
        Self {
            spins: 2_000,
            seed: Some(42),
            batch_size: 250,
            ..Default::default()
        }
    }

    /// Set round count
    pub fn with_spins(mut self, spins: u64) -> Self {
        self.spins = spins;
        self
    }

    /// Set stake per round
    pub fn with_bet(mut self, bet: f64) -> Self {
        self.bet = bet;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Keep the per-round payout log
    pub fn with_payout_log(mut self, keep: bool) -> Self {
        self.keep_payout_log = keep;
        self
    }

    /// Worker count after resolving 0 to the CPU count
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(SimError::InvalidConfig(format!("bet must be positive, got {}", self.bet)));
        }
        if self.batch_size == 0 {
            return Err(SimError::InvalidConfig("batch_size must be positive".into()));
        }
        Ok(())
    }
}
