//! Spin and round results

use mv_stage::{EventBook, Position, SpinResultEvent};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::ways::WayWin;

/// Which distribution and rules a spin runs under
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    #[serde(rename = "basegame")]
    Base,
    #[serde(rename = "freegame")]
    Free,
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Base => "basegame",
            Self::Free => "freegame",
        }
    }
}

/// One evaluated spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// 0 for the base spin, 1.. for free spins
    pub index: u32,
    pub mode: GameMode,
    /// Board as drawn
    pub original_board: Board,
    /// Board after transformations, as evaluated
    pub board: Board,
    pub wins: Vec<WayWin>,
    /// Sum of win payouts after session boosts
    pub total_win: f64,
    /// Session collector total after this spin
    pub collector_count: u32,
    /// Labels of transformations active for this spin
    pub active_transformations: Vec<String>,
    pub scatter_count: u8,
    /// Free spins added by this spin (after the cap)
    pub free_spins_awarded: u32,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Cells whose symbol was changed by a transformation
    pub fn transformed_positions(&self) -> Vec<Position> {
        self.original_board.diff_positions(&self.board)
    }

    /// Event payload; the drawn board is only attached when it differs
    pub fn to_event(&self) -> SpinResultEvent {
        let original_reels = if self.original_board != self.board {
            self.original_board.to_codes()
        } else {
            Vec::new()
        };
        SpinResultEvent {
            spin_index: self.index,
            game_mode: self.mode.name().to_string(),
            reels: self.board.to_codes(),
            original_reels,
            wins: self.wins.iter().map(WayWin::to_summary).collect(),
            total_win: self.total_win,
            collector_count: self.collector_count,
        }
    }
}

/// A base spin plus any bonus session it triggered
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    pub bet: f64,
    pub base: SpinOutcome,
    pub free_spins: Vec<SpinOutcome>,
    /// Round payout, clamped to the win cap
    pub total_win: f64,
    pub wincap_hit: bool,
    /// Free spins awarded over the session (initial + retriggers)
    pub free_spins_awarded: u32,
    pub final_collector_count: u32,
    /// Every event recorded while playing the round
    pub events: EventBook,
}

impl RoundResult {
    /// Did the base spin open a bonus session?
    pub fn triggered_bonus(&self) -> bool {
        self.base.free_spins_awarded > 0
    }

    pub fn free_spins_played(&self) -> usize {
        self.free_spins.len()
    }

    /// Base spin followed by free spins
    pub fn spins(&self) -> impl Iterator<Item = &SpinOutcome> {
        std::iter::once(&self.base).chain(self.free_spins.iter())
    }

    pub fn base_win(&self) -> f64 {
        self.base.total_win
    }

    /// Uncapped sum of free spin payouts
    pub fn free_win(&self) -> f64 {
        self.free_spins.iter().map(|s| s.total_win).sum()
    }

    /// Round payout as a multiple of bet
    pub fn win_multiplier(&self) -> f64 {
        if self.bet > 0.0 {
            self.total_win / self.bet
        } else {
            0.0
        }
    }
}
