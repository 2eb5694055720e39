//! Simulation runner: batches of rounds on a rayon pool

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use mv_ways::{GameConfig, SpinEngine};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::accumulator::SimAccumulator;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::report::SimReport;

/// Cloneable stop signal for a running simulation
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request a stop; rounds already started finish, no new ones begin
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Monte-Carlo runner over one game configuration
pub struct Simulator<'a> {
    game: &'a GameConfig,
    config: SimConfig,
    cancel: CancelHandle,
    rounds_done: Arc<AtomicU64>,
}

impl<'a> Simulator<'a> {
    /// Validate both configurations and build a runner
    pub fn new(game: &'a GameConfig, config: SimConfig) -> SimResult<Self> {
        game.validate()?;
        config.validate()?;
        Ok(Self {
            game,
            config,
            cancel: CancelHandle::default(),
            rounds_done: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Handle for stopping the run from another thread
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Rounds completed so far in the current run
    pub fn progress(&self) -> u64 {
        self.rounds_done.load(Ordering::Relaxed)
    }

    /// Run with the configured round count and bet
    pub fn run_configured(&self) -> SimResult<SimReport> {
        self.run(self.config.spins, self.config.bet)
    }

    /// Play `rounds` rounds at `bet` and aggregate them.
    ///
    /// After [`cancel`](Self::cancel) the report covers every round that
    /// finished and is flagged as cancelled.
    pub fn run(&self, rounds: u64, bet: f64) -> SimResult<SimReport> {
        if !bet.is_finite() || bet <= 0.0 {
            return Err(SimError::InvalidConfig(format!("bet must be positive, got {}", bet)));
        }

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let batch_size = self.config.batch_size;
        let batches = rounds.div_ceil(batch_size);
        let workers = self.config.effective_workers();
        self.rounds_done.store(0, Ordering::Relaxed);

        log::info!(
            "Simulating {} rounds of '{}' at bet {} (seed {}, {} workers, {} batches)",
            rounds,
            self.game.name,
            bet,
            seed,
            workers,
            batches
        );
        let started = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;

        let partials: Vec<SimResult<SimAccumulator>> = pool.install(|| {
            (0..batches)
                .into_par_iter()
                .map(|batch| {
                    let start = batch * batch_size;
                    let end = (start + batch_size).min(rounds);
                    self.run_batch(seed, batch, start..end, bet)
                })
                .collect()
        });

        // Ordered reduction keeps float sums independent of scheduling
        let mut total = SimAccumulator::new(self.config.keep_payout_log);
        for partial in partials {
            total.merge(partial?);
        }

        let cancelled = self.is_cancelled();
        if cancelled {
            log::warn!("Simulation cancelled after {} of {} rounds", total.rounds, rounds);
        }
        log::info!(
            "Simulation finished: {} rounds, RTP {:.4}, hit rate {:.4} in {:.2?}",
            total.rounds,
            total.rtp(),
            total.hit_rate(),
            started.elapsed()
        );

        Ok(SimReport::new(&self.game.name, seed, bet, rounds, cancelled, total))
    }

    fn run_batch(&self, seed: u64, batch: u64, ids: std::ops::Range<u64>, bet: f64) -> SimResult<SimAccumulator> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(batch);
        let mut engine = SpinEngine::with_rng(self.game, rng)?;
        let mut acc = SimAccumulator::new(self.config.keep_payout_log);

        for round_id in ids {
            if self.is_cancelled() {
                break;
            }
            let round = engine.play_round(bet);
            acc.record_round(round_id, &round);
            self.rounds_done.fetch_add(1, Ordering::Relaxed);
        }

        Ok(acc)
    }
}
