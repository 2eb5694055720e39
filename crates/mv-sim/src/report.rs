//! Simulation report

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::accumulator::{PayoutEntry, SimAccumulator};
use crate::error::SimResult;

/// One histogram row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub label: String,
    pub count: u64,
    /// Fraction of all rounds
    pub share: f64,
}

/// Aggregate results of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub game: String,
    pub seed: u64,
    pub bet: f64,
    pub requested_rounds: u64,
    pub rounds: u64,
    /// True when the run was stopped before `requested_rounds`
    pub cancelled: bool,

    pub total_wagered: f64,
    pub total_won: f64,
    pub rtp: f64,
    pub rtp_std_error: f64,
    pub base_rtp: f64,
    pub free_rtp: f64,
    pub hit_rate: f64,
    /// Average winning round payout
    pub mean_win: f64,
    /// Largest round win as a bet multiple
    pub max_win: f64,

    pub bonus_triggers: u64,
    pub bonus_trigger_rate: f64,
    pub free_spins_played: u64,
    pub wincap_hits: u64,

    pub histogram: Vec<HistogramBucket>,

    /// Per-round payouts, when requested
    #[serde(skip)]
    pub payout_log: Option<Vec<PayoutEntry>>,
}

impl SimReport {
    pub fn new(game: &str, seed: u64, bet: f64, requested_rounds: u64, cancelled: bool, acc: SimAccumulator) -> Self {
        let rounds = acc.rounds;
        let histogram = acc
            .histogram
            .iter()
            .map(|(label, count)| HistogramBucket {
                label: label.to_string(),
                count,
                share: if rounds > 0 { count as f64 / rounds as f64 } else { 0.0 },
            })
            .collect();

        Self {
            game: game.to_string(),
            seed,
            bet,
            requested_rounds,
            rounds,
            cancelled,
            total_wagered: acc.total_wagered,
            total_won: acc.total_won,
            rtp: acc.rtp(),
            rtp_std_error: acc.rtp_std_error(),
            base_rtp: acc.base_rtp(),
            free_rtp: acc.rtp() - acc.base_rtp(),
            hit_rate: acc.hit_rate(),
            mean_win: acc.mean_win(),
            max_win: acc.max_win,
            bonus_triggers: acc.bonus_triggers,
            bonus_trigger_rate: acc.bonus_trigger_rate(),
            free_spins_played: acc.free_spins_played,
            wincap_hits: acc.wincap_hits,
            histogram,
            payout_log: acc.payout_log,
        }
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        let bonus = if self.bonus_triggers > 0 {
            format!("1 in {:.0}", self.rounds as f64 / self.bonus_triggers as f64)
        } else {
            "none".to_string()
        };
        format!(
            "{}: {} rounds @ {:.2} | RTP {:.2}% ±{:.2}% (base {:.2}%, free {:.2}%) | hit {:.2}% | bonus {} | max {:.1}x | capped {}{}",
            self.game,
            self.rounds,
            self.bet,
            self.rtp * 100.0,
            self.rtp_std_error * 196.0,
            self.base_rtp * 100.0,
            self.free_rtp * 100.0,
            self.hit_rate * 100.0,
            bonus,
            self.max_win,
            self.wincap_hits,
            if self.cancelled { " (cancelled)" } else { "" },
        )
    }

    /// Pretty JSON, payout log excluded
    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Payout log as `id,1,credits` lines (100 credits = 1× bet)
    pub fn payout_log_csv(&self) -> String {
        let mut out = String::new();
        for entry in self.payout_log.iter().flatten() {
            out.push_str(&entry.to_csv_line(self.bet));
            out.push('\n');
        }
        out
    }

    /// Write the payout log to `path`
    pub fn write_payout_log(&self, path: impl AsRef<Path>) -> SimResult<()> {
        fs::write(path.as_ref(), self.payout_log_csv())?;
        log::info!("Payout log written to {}", path.as_ref().display());
        Ok(())
    }
}
