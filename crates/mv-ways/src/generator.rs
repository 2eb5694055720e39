//! Board generation: weighted per-cell draws or reel-strip windows
//!
//! Both sources are validated when the generator is built; `generate` itself
//! cannot fail.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};
use crate::error::{SlotError, SlotResult};
use crate::symbols::Symbol;

// ═══════════════════════════════════════════════════════════════════════════════
// WEIGHTED DISTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Symbol distribution drawn uniformly over its weight-expanded population
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSymbols {
    symbols: Vec<Symbol>,
    /// Running weight total up to and including each symbol
    cumulative: Vec<u32>,
}

impl WeightedSymbols {
    /// Build from `(symbol, weight)` pairs; zero weights and empty input are rejected
    pub fn new(weights: &BTreeMap<Symbol, u32>) -> SlotResult<Self> {
        if weights.is_empty() {
            return Err(SlotError::EmptyDistribution);
        }

        let mut symbols = Vec::with_capacity(weights.len());
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total: u32 = 0;

        for (&symbol, &weight) in weights {
            if weight == 0 {
                return Err(SlotError::InvalidWeight { symbol, weight });
            }
            total = total
                .checked_add(weight)
                .ok_or_else(|| SlotError::InvalidConfig("total symbol weight overflows".into()))?;
            symbols.push(symbol);
            cumulative.push(total);
        }

        Ok(Self {
            symbols,
            cumulative,
        })
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Probability of drawing `symbol`
    pub fn probability(&self, symbol: Symbol) -> f64 {
        let total = self.total_weight();
        if total == 0 {
            return 0.0;
        }
        self.symbols
            .iter()
            .position(|&s| s == symbol)
            .map(|i| {
                let prev = if i == 0 { 0 } else { self.cumulative[i - 1] };
                (self.cumulative[i] - prev) as f64 / total as f64
            })
            .unwrap_or(0.0)
    }

    /// Draw one symbol
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        let ticket = rng.random_range(0..self.total_weight());
        let index = self.cumulative.partition_point(|&c| c <= ticket);
        self.symbols[index]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL STRIPS
// ═══════════════════════════════════════════════════════════════════════════════

/// A circular reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    pub symbols: Vec<Symbol>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Symbol at `position`, wrapping around the strip end (`None` on an empty strip)
    pub fn symbol_at(&self, position: usize) -> Option<Symbol> {
        let index = position.checked_rem(self.symbols.len())?;
        self.symbols.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Where cell symbols come from
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolSource {
    /// Independent draw per cell
    Weighted(WeightedSymbols),
    /// Contiguous window per reel at a random stop
    Strips(Vec<ReelStrip>),
}

/// Produces boards of a fixed shape
#[derive(Debug, Clone, PartialEq)]
pub struct BoardGenerator {
    reels: usize,
    rows: usize,
    source: SymbolSource,
    /// Multiplier attached to each wild variant
    wild_values: BTreeMap<Symbol, u32>,
    /// When set, every plain `W` is replaced by a draw from this distribution
    wild_upgrade: Option<WeightedSymbols>,
}

impl BoardGenerator {
    /// Weighted per-cell generator
    pub fn weighted(reels: usize, rows: usize, weights: &BTreeMap<Symbol, u32>) -> SlotResult<Self> {
        Self::check_shape(reels, rows)?;
        Ok(Self::with_source(
            reels,
            rows,
            SymbolSource::Weighted(WeightedSymbols::new(weights)?),
        ))
    }

    /// Reel-strip generator; one strip per reel
    pub fn from_strips(reels: usize, rows: usize, strips: Vec<ReelStrip>) -> SlotResult<Self> {
        Self::check_shape(reels, rows)?;
        if strips.len() != reels {
            return Err(SlotError::ReelCountMismatch {
                expected: reels,
                actual: strips.len(),
            });
        }
        if let Some(reel) = strips.iter().position(ReelStrip::is_empty) {
            return Err(SlotError::EmptyReelStrip { reel });
        }
        Ok(Self::with_source(reels, rows, SymbolSource::Strips(strips)))
    }

    fn with_source(reels: usize, rows: usize, source: SymbolSource) -> Self {
        let wild_values = Symbol::WILDS
            .iter()
            .filter_map(|w| w.wild_multiplier().map(|m| (*w, m)))
            .collect();
        Self {
            reels,
            rows,
            source,
            wild_values,
            wild_upgrade: None,
        }
    }

    fn check_shape(reels: usize, rows: usize) -> SlotResult<()> {
        if reels == 0 || rows == 0 {
            return Err(SlotError::InvalidConfig(format!(
                "grid must be at least 1×1, got {}×{}",
                reels, rows
            )));
        }
        if reels > u8::MAX as usize || rows > u8::MAX as usize {
            return Err(SlotError::InvalidConfig(format!(
                "grid {}×{} exceeds position range",
                reels, rows
            )));
        }
        Ok(())
    }

    /// Override the multiplier attached to each wild variant
    pub fn with_wild_values(mut self, values: &BTreeMap<Symbol, u32>) -> Self {
        self.wild_values.extend(values.iter().map(|(s, m)| (*s, *m)));
        self
    }

    /// Replace plain wilds with multiplier wilds drawn from `weights`
    pub fn with_wild_upgrade(mut self, weights: &BTreeMap<Symbol, u32>) -> SlotResult<Self> {
        if let Some(bad) = weights.keys().find(|s| !s.is_wild()) {
            return Err(SlotError::InvalidConfig(format!(
                "wild upgrade weights name non-wild symbol {}",
                bad
            )));
        }
        self.wild_upgrade = Some(WeightedSymbols::new(weights)?);
        Ok(self)
    }

    pub fn reels(&self) -> usize {
        self.reels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn source(&self) -> &SymbolSource {
        &self.source
    }

    /// Draw a board
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let mut reels = Vec::with_capacity(self.reels);

        match &self.source {
            SymbolSource::Weighted(dist) => {
                for _ in 0..self.reels {
                    let column: Vec<Symbol> = (0..self.rows).map(|_| dist.draw(rng)).collect();
                    reels.push(column);
                }
            }
            SymbolSource::Strips(strips) => {
                for strip in strips {
                    let stop = rng.random_range(0..strip.len());
                    // strips are checked non-empty in `from_strips`
                    let column: Vec<Symbol> =
                        (0..self.rows).filter_map(|row| strip.symbol_at(stop + row)).collect();
                    reels.push(column);
                }
            }
        }

        let mut cells = Vec::with_capacity(self.reels);
        for column in reels {
            let mut reel = Vec::with_capacity(self.rows);
            for symbol in column {
                reel.push(self.make_cell(symbol, rng));
            }
            cells.push(reel);
        }

        Board::from_cells_unchecked(cells)
    }

    fn make_cell<R: Rng + ?Sized>(&self, symbol: Symbol, rng: &mut R) -> Cell {
        let symbol = match (&self.wild_upgrade, symbol) {
            (Some(upgrade), Symbol::Wild) => upgrade.draw(rng),
            _ => symbol,
        };
        match self.wild_values.get(&symbol) {
            Some(&m) => Cell::with_multiplier(symbol, m),
            None => Cell::new(symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn weights(pairs: &[(Symbol, u32)]) -> BTreeMap<Symbol, u32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_rejects_malformed_distribution() {
        assert!(matches!(
            WeightedSymbols::new(&BTreeMap::new()),
            Err(SlotError::EmptyDistribution)
        ));
        assert!(matches!(
            WeightedSymbols::new(&weights(&[(Symbol::H1, 2), (Symbol::L1, 0)])),
            Err(SlotError::InvalidWeight {
                symbol: Symbol::L1,
                weight: 0
            })
        ));
    }

    #[test]
    fn test_draw_frequencies_follow_weights() {
        let dist = WeightedSymbols::new(&weights(&[(Symbol::H1, 1), (Symbol::L1, 3)])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let n = 40_000;
        let h1 = (0..n).filter(|_| dist.draw(&mut rng) == Symbol::H1).count();
        let share = h1 as f64 / n as f64;
        assert!((share - 0.25).abs() < 0.01, "H1 share {}", share);
        assert_eq!(dist.probability(Symbol::L1), 0.75);
        assert_eq!(dist.probability(Symbol::Collector), 0.0);
    }

    #[test]
    fn test_weighted_board_shape() {
        let generator =
            BoardGenerator::weighted(5, 4, &weights(&[(Symbol::H1, 1), (Symbol::L2, 1)])).unwrap();
        let board = generator.generate(&mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(board.reel_count(), 5);
        assert_eq!(board.row_count(), 4);
    }

    #[test]
    fn test_strip_window_wraps() {
        let strips = (0..3)
            .map(|_| ReelStrip::new(vec![Symbol::H1, Symbol::H2, Symbol::H3]))
            .collect();
        let generator = BoardGenerator::from_strips(3, 4, strips).unwrap();
        let board = generator.generate(&mut ChaCha8Rng::seed_from_u64(3));

        for reel in board.reels() {
            // Consecutive strip positions, wrapping after H3
            for pair in reel.windows(2) {
                let next = match pair[0].symbol {
                    Symbol::H1 => Symbol::H2,
                    Symbol::H2 => Symbol::H3,
                    _ => Symbol::H1,
                };
                assert_eq!(pair[1].symbol, next);
            }
        }
    }

    #[test]
    fn test_symbol_at_on_empty_strip() {
        let strip = ReelStrip::new(vec![Symbol::H1, Symbol::Scatter]);
        assert_eq!(strip.symbol_at(3), Some(Symbol::Scatter));
        assert_eq!(ReelStrip::new(vec![]).symbol_at(0), None);
    }

    #[test]
    fn test_strip_validation() {
        let one = vec![ReelStrip::new(vec![Symbol::H1])];
        assert!(matches!(
            BoardGenerator::from_strips(2, 4, one),
            Err(SlotError::ReelCountMismatch {
                expected: 2,
                actual: 1
            })
        ));

        let with_empty = vec![ReelStrip::new(vec![Symbol::H1]), ReelStrip::new(vec![])];
        assert!(matches!(
            BoardGenerator::from_strips(2, 4, with_empty),
            Err(SlotError::EmptyReelStrip { reel: 1 })
        ));
    }

    #[test]
    fn test_wild_upgrade_replaces_plain_wilds() {
        let generator = BoardGenerator::weighted(5, 4, &weights(&[(Symbol::Wild, 1)]))
            .unwrap()
            .with_wild_upgrade(&weights(&[(Symbol::Wild2x, 60), (Symbol::Wild3x, 40)]))
            .unwrap();
        let board = generator.generate(&mut ChaCha8Rng::seed_from_u64(11));

        for (_, cell) in board.cells() {
            assert!(matches!(cell.symbol, Symbol::Wild2x | Symbol::Wild3x));
            assert_eq!(cell.multiplier, cell.symbol.wild_multiplier());
        }

        assert!(
            BoardGenerator::weighted(5, 4, &weights(&[(Symbol::Wild, 1)]))
                .unwrap()
                .with_wild_upgrade(&weights(&[(Symbol::H1, 1)]))
                .is_err()
        );
    }
}
