//! Ways evaluation with multiplicative wild multipliers
//!
//! For each paytable symbol the evaluator walks reels left to right and keeps
//! the rows that match (the symbol itself, or a wild that may stand in for
//! it). The chain ends at the first reel without a match. Every
//! left-to-right path through the matched rows is one "way"; the wild
//! multipliers along a path multiply, and the per-path products are averaged
//! over all ways:
//!
//! ```text
//! reel:     1      2      3
//!          H1     2X     H1         paths: H1·2X·H1 = 2
//!          3X                              3X·2X·H1 = 6
//!
//! ways = 2·1·1 = 2     average multiplier = (2 + 6) / 2 = 4
//! payout = pay(H1, 3) × bet × ways × average multiplier
//! ```

use mv_stage::{Position, WinSummary};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::paytable::PayTable;
use crate::symbols::Symbol;

/// One symbol's ways win on one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WayWin {
    pub symbol: Symbol,
    /// Contiguous reels matched from reel 1
    pub match_length: u8,
    /// Distinct left-to-right paths (product of matched rows per reel)
    pub ways: u32,
    /// Ways-weighted average of per-path multiplier products
    pub multiplier: f64,
    /// Paytable value for `(symbol, match_length)`
    pub base_pay: f64,
    pub payout: f64,
    /// Every cell on a matched reel that took part
    pub positions: Vec<Position>,
}

impl WayWin {
    /// Event payload view
    pub fn to_summary(&self) -> WinSummary {
        WinSummary {
            symbol: self.symbol.code().to_string(),
            count: self.match_length,
            ways: self.ways,
            multiplier: self.multiplier,
            payout: self.payout,
            positions: self.positions.clone(),
        }
    }
}

/// Sum of payouts
pub fn total_payout(wins: &[WayWin]) -> f64 {
    wins.iter().map(|w| w.payout).sum()
}

/// A matching row on one reel and the multiplier it contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RowMatch {
    row: u8,
    multiplier: u32,
}

/// Evaluates boards against a paytable
#[derive(Debug, Clone, Copy)]
pub struct WaysEvaluator<'a> {
    paytable: &'a PayTable,
}

impl<'a> WaysEvaluator<'a> {
    pub fn new(paytable: &'a PayTable) -> Self {
        Self { paytable }
    }

    pub fn paytable(&self) -> &PayTable {
        self.paytable
    }

    /// Every winning symbol on `board`, in paytable order
    pub fn evaluate(&self, board: &Board, bet: f64) -> Vec<WayWin> {
        self.paytable
            .symbols()
            .filter_map(|symbol| self.evaluate_symbol(board, symbol, bet))
            .collect()
    }

    /// Win for a single symbol, or `None` when it does not pay
    pub fn evaluate_symbol(&self, board: &Board, symbol: Symbol, bet: f64) -> Option<WayWin> {
        let matched = Self::matched_reels(board, symbol);
        if matched.is_empty() {
            return None;
        }

        let match_length = matched.len() as u8;
        let base_pay = self.paytable.pay(symbol, match_length)?;

        let ways = matched
            .iter()
            .fold(1u32, |acc, reel| acc.saturating_mul(reel.len() as u32));
        let path_sum = path_multiplier_sum(&matched);
        let multiplier = path_sum as f64 / ways as f64;
        let payout = base_pay * bet * ways as f64 * multiplier;

        let positions = matched
            .iter()
            .enumerate()
            .flat_map(|(reel, rows)| rows.iter().map(move |m| (reel as u8, m.row)))
            .collect();

        Some(WayWin {
            symbol,
            match_length,
            ways,
            multiplier,
            base_pay,
            payout,
            positions,
        })
    }

    /// Matching rows per reel up to (not including) the first reel without one
    fn matched_reels(board: &Board, symbol: Symbol) -> Vec<Vec<RowMatch>> {
        let substitutable = symbol.accepts_wild();
        let mut matched = Vec::with_capacity(board.reel_count());

        for cells in board.reels() {
            let rows: Vec<RowMatch> = cells
                .iter()
                .enumerate()
                .filter_map(|(row, cell)| {
                    if cell.symbol == symbol {
                        Some(RowMatch {
                            row: row as u8,
                            multiplier: 1,
                        })
                    } else if substitutable && cell.symbol.is_wild() {
                        Some(RowMatch {
                            row: row as u8,
                            multiplier: cell.path_multiplier(),
                        })
                    } else {
                        None
                    }
                })
                .collect();

            if rows.is_empty() {
                break;
            }
            matched.push(rows);
        }

        matched
    }
}

/// Sum over every path through `reels` of the product of its multipliers
fn path_multiplier_sum(reels: &[Vec<RowMatch>]) -> u64 {
    match reels.split_first() {
        None => 1,
        Some((first, rest)) => first.iter().fold(0u64, |acc, m| {
            acc.saturating_add((m.multiplier as u64).saturating_mul(path_multiplier_sum(rest)))
        }),
    }
}
