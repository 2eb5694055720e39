//! Running totals for a simulation
//!
//! Each batch owns one accumulator and records whole rounds only, so any
//! accumulator is always a consistent snapshot of the rounds it has seen.

use mv_ways::RoundResult;
use serde::{Deserialize, Serialize};

/// Histogram bucket labels, in multiples of bet
pub const HISTOGRAM_LABELS: [&str; 7] = ["0", "0-1", "1-10", "10-100", "100-1000", "1000-10000", "10000+"];

/// Upper bounds (inclusive) of every bucket but the last
const BUCKET_BOUNDS: [f64; 5] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0];

/// Round win sizes bucketed by bet multiple
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinHistogram {
    pub counts: [u64; 7],
}

impl WinHistogram {
    /// Bucket for a win of `multiplier` × bet
    pub fn bucket(multiplier: f64) -> usize {
        if multiplier <= 0.0 {
            return 0;
        }
        BUCKET_BOUNDS
            .iter()
            .position(|&bound| multiplier <= bound)
            .map(|i| i + 1)
            .unwrap_or(HISTOGRAM_LABELS.len() - 1)
    }

    pub fn record(&mut self, multiplier: f64) {
        self.counts[Self::bucket(multiplier)] += 1;
    }

    pub fn merge(&mut self, other: &WinHistogram) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(label, count)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        HISTOGRAM_LABELS.iter().copied().zip(self.counts.iter().copied())
    }
}

/// One line of the payout log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutEntry {
    pub round_id: u64,
    pub payout: f64,
}

impl PayoutEntry {
    /// `id,1,credits` with 100 credits per bet
    pub fn to_csv_line(&self, bet: f64) -> String {
        let credits = if bet > 0.0 {
            (self.payout / bet * 100.0).round() as u64
        } else {
            0
        };
        format!("{},1,{}", self.round_id, credits)
    }
}

/// Aggregated round statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimAccumulator {
    pub rounds: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    /// Portion of `total_won` paid by base spins
    pub base_won: f64,
    /// Rounds paying more than zero
    pub hits: u64,
    pub bonus_triggers: u64,
    pub wincap_hits: u64,
    pub free_spins_played: u64,
    /// Largest round win as a bet multiple
    pub max_win: f64,
    /// Sum of squared round win multiples, for the RTP standard error
    pub sum_sq_multiplier: f64,
    pub histogram: WinHistogram,
    pub payout_log: Option<Vec<PayoutEntry>>,
}

impl SimAccumulator {
    pub fn new(keep_payout_log: bool) -> Self {
        Self {
            payout_log: keep_payout_log.then(Vec::new),
            ..Default::default()
        }
    }

    /// Fold one finished round in
    pub fn record_round(&mut self, round_id: u64, round: &RoundResult) {
        let won = round.total_win;
        let multiplier = round.win_multiplier();

        self.rounds += 1;
        self.total_wagered += round.bet;
        self.total_won += won;
        self.base_won += round.base_win().min(won);

        if won > 0.0 {
            self.hits += 1;
        }
        if round.triggered_bonus() {
            self.bonus_triggers += 1;
        }
        if round.wincap_hit {
            self.wincap_hits += 1;
        }
        self.free_spins_played += round.free_spins_played() as u64;
        self.max_win = self.max_win.max(multiplier);
        self.sum_sq_multiplier += multiplier * multiplier;
        self.histogram.record(multiplier);

        if let Some(log) = self.payout_log.as_mut() {
            log.push(PayoutEntry {
                round_id,
                payout: won,
            });
        }
    }

    /// Append another accumulator's totals (call in batch order)
    pub fn merge(&mut self, other: SimAccumulator) {
        self.rounds += other.rounds;
        self.total_wagered += other.total_wagered;
        self.total_won += other.total_won;
        self.base_won += other.base_won;
        self.hits += other.hits;
        self.bonus_triggers += other.bonus_triggers;
        self.wincap_hits += other.wincap_hits;
        self.free_spins_played += other.free_spins_played;
        self.max_win = self.max_win.max(other.max_win);
        self.sum_sq_multiplier += other.sum_sq_multiplier;
        self.histogram.merge(&other.histogram);

        if let (Some(mine), Some(theirs)) = (self.payout_log.as_mut(), other.payout_log) {
            mine.extend(theirs);
        }
    }

    /// total won / total wagered (0 when nothing was wagered)
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.total_won / self.total_wagered
        } else {
            0.0
        }
    }

    pub fn base_rtp(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.base_won / self.total_wagered
        } else {
            0.0
        }
    }

    /// Standard error of the RTP estimate (per-round returns treated as i.i.d.)
    pub fn rtp_std_error(&self) -> f64 {
        if self.rounds < 2 {
            return 0.0;
        }
        let n = self.rounds as f64;
        let mean = self.rtp();
        let variance = (self.sum_sq_multiplier / n - mean * mean).max(0.0);
        (variance / n).sqrt()
    }

    pub fn hit_rate(&self) -> f64 {
        if self.rounds > 0 {
            self.hits as f64 / self.rounds as f64
        } else {
            0.0
        }
    }

    /// Average payout of winning rounds
    pub fn mean_win(&self) -> f64 {
        if self.hits > 0 {
            self.total_won / self.hits as f64
        } else {
            0.0
        }
    }

    pub fn bonus_trigger_rate(&self) -> f64 {
        if self.rounds > 0 {
            self.bonus_triggers as f64 / self.rounds as f64
        } else {
            0.0
        }
    }
}
