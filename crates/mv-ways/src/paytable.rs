//! Paytable: base pay per (symbol, match length), as a multiple of bet

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::Symbol;

/// Pay values keyed by symbol, then by contiguous match length
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayTable {
    pays: BTreeMap<Symbol, BTreeMap<u8, f64>>,
}

impl PayTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Tuned production table
    pub fn standard() -> Self {
        Self::new()
            .with_pays(Symbol::H1, &[(2, 0.15), (3, 0.59), (4, 1.16), (5, 2.43)])
            .with_pays(Symbol::H2, &[(3, 0.38), (4, 0.69), (5, 1.47)])
            .with_pays(Symbol::H3, &[(3, 0.29), (4, 0.59), (5, 1.16)])
            .with_pays(Symbol::H4, &[(3, 0.14), (4, 0.29), (5, 0.69)])
            .with_pays(Symbol::L1, &[(3, 0.06), (4, 0.11), (5, 0.29)])
            .with_pays(Symbol::L2, &[(3, 0.03), (4, 0.07), (5, 0.23)])
            .with_pays(Symbol::L3, &[(3, 0.03), (4, 0.07), (5, 0.23)])
            .with_pays(Symbol::L4, &[(3, 0.02), (4, 0.05), (5, 0.14)])
            .with_pays(Symbol::L6, &[(3, 0.01), (4, 0.03), (5, 0.11)])
    }

    /// Set pays for one symbol (builder)
    pub fn with_pays(mut self, symbol: Symbol, pays: &[(u8, f64)]) -> Self {
        for &(count, pay) in pays {
            self.insert(symbol, count, pay);
        }
        self
    }

    /// Set one entry
    pub fn insert(&mut self, symbol: Symbol, count: u8, pay: f64) {
        self.pays.entry(symbol).or_default().insert(count, pay);
    }

    /// Minimum contiguous reels for a win: 2 for the top tier, 3 otherwise
    pub fn min_match(symbol: Symbol) -> u8 {
        if symbol == Symbol::TOP_TIER { 2 } else { 3 }
    }

    /// Base pay for `count` reels of `symbol`.
    ///
    /// `None` below the symbol's minimum match or when no entry exists,
    /// regardless of what the table holds.
    pub fn pay(&self, symbol: Symbol, count: u8) -> Option<f64> {
        if count < Self::min_match(symbol) {
            return None;
        }
        self.pays.get(&symbol)?.get(&count).copied()
    }

    /// Symbols with at least one entry, in evaluation order
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.pays.keys().copied()
    }

    /// Largest single entry
    pub fn max_pay(&self) -> f64 {
        self.pays
            .values()
            .flat_map(|row| row.values().copied())
            .fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.pays.values().all(BTreeMap::is_empty)
    }

    /// Reject non-payable symbols, zero-length matches and non-finite or negative pays
    pub fn validate(&self) -> SlotResult<()> {
        if self.is_empty() {
            return Err(SlotError::InvalidConfig("paytable is empty".into()));
        }
        for (symbol, row) in &self.pays {
            if !symbol.accepts_wild() {
                return Err(SlotError::InvalidConfig(format!(
                    "paytable lists non-payable symbol {}",
                    symbol
                )));
            }
            for (&count, &pay) in row {
                if count == 0 {
                    return Err(SlotError::InvalidConfig(format!(
                        "paytable entry for {} has match length 0",
                        symbol
                    )));
                }
                if !pay.is_finite() || pay < 0.0 {
                    return Err(SlotError::InvalidConfig(format!(
                        "paytable entry {}×{} has invalid pay {}",
                        symbol, count, pay
                    )));
                }
            }
        }
        Ok(())
    }
}
