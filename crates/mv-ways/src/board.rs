//! Board: reels of cells, each cell a symbol plus optional wild multiplier

use std::collections::BTreeMap;

use mv_stage::Position;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::symbols::Symbol;

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub symbol: Symbol,
    /// Attached multiplier, only set on wilds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,
}

impl Cell {
    /// Cell carrying the symbol's default wild multiplier (if any)
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            multiplier: symbol.wild_multiplier(),
        }
    }

    /// Cell with an explicit multiplier
    pub fn with_multiplier(symbol: Symbol, multiplier: u32) -> Self {
        Self {
            symbol,
            multiplier: Some(multiplier),
        }
    }

    /// Multiplier this cell contributes to a path: the attached value, else the
    /// wild's fixed value, else 1
    pub fn path_multiplier(&self) -> u32 {
        self.multiplier.or(self.symbol.wild_multiplier()).unwrap_or(1)
    }
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Self {
        Cell::new(symbol)
    }
}

/// A rectangular grid stored reel-major: `reels[reel][row]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardCells")]
pub struct Board {
    reels: Vec<Vec<Cell>>,
}

/// Wire shape of a board, checked by [`Board::new`] on the way in
#[derive(Deserialize)]
struct BoardCells {
    reels: Vec<Vec<Cell>>,
}

impl TryFrom<BoardCells> for Board {
    type Error = SlotError;

    fn try_from(cells: BoardCells) -> SlotResult<Self> {
        Board::new(cells.reels)
    }
}

impl Board {
    /// Build a board, rejecting empty or ragged grids
    pub fn new(reels: Vec<Vec<Cell>>) -> SlotResult<Self> {
        let expected = reels.first().map(Vec::len).ok_or(SlotError::EmptyBoard)?;
        if expected == 0 {
            return Err(SlotError::GridMismatch {
                reel: 0,
                expected: 1,
                actual: 0,
            });
        }
        for (reel, cells) in reels.iter().enumerate() {
            if cells.len() != expected {
                return Err(SlotError::GridMismatch {
                    reel,
                    expected,
                    actual: cells.len(),
                });
            }
        }
        Ok(Self { reels })
    }

    /// Construct from cells whose shape the caller already guarantees
    pub(crate) fn from_cells_unchecked(reels: Vec<Vec<Cell>>) -> Self {
        Self { reels }
    }

    /// Build from bare symbols; wilds get their default multiplier
    pub fn from_symbols(reels: Vec<Vec<Symbol>>) -> SlotResult<Self> {
        Self::new(
            reels
                .into_iter()
                .map(|reel| reel.into_iter().map(Cell::new).collect())
                .collect(),
        )
    }

    /// Parse whitespace-separated symbol codes, one string per reel.
    ///
    /// ```
    /// use mv_ways::Board;
    /// let board = Board::parse(&["H1 L1", "2X L2"]).unwrap();
    /// assert_eq!(board.row_count(), 2);
    /// ```
    pub fn parse(reels: &[&str]) -> SlotResult<Self> {
        let symbols = reels
            .iter()
            .map(|reel| {
                reel.split_whitespace()
                    .map(str::parse)
                    .collect::<SlotResult<Vec<Symbol>>>()
            })
            .collect::<SlotResult<Vec<_>>>()?;
        Self::from_symbols(symbols)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    pub fn row_count(&self) -> usize {
        self.reels.first().map(Vec::len).unwrap_or(0)
    }

    /// Cells of one reel, top to bottom
    pub fn reel(&self, reel: usize) -> &[Cell] {
        &self.reels[reel]
    }

    pub fn reels(&self) -> &[Vec<Cell>] {
        &self.reels
    }

    pub fn get(&self, reel: usize, row: usize) -> Option<&Cell> {
        self.reels.get(reel).and_then(|r| r.get(row))
    }

    /// All cells with their positions, reel-major
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.reels.iter().enumerate().flat_map(|(reel, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(row, cell)| ((reel as u8, row as u8), cell))
        })
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.reels.iter_mut().flat_map(|reel| reel.iter_mut())
    }

    /// Positions holding `symbol`
    pub fn positions_of(&self, symbol: Symbol) -> Vec<Position> {
        self.cells()
            .filter(|(_, cell)| cell.symbol == symbol)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Occurrences of `symbol` anywhere on the board
    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells().filter(|(_, cell)| cell.symbol == symbol).count()
    }

    /// Reels holding at least `min` copies of `symbol`
    pub fn stack_count(&self, symbol: Symbol, min: usize) -> usize {
        self.reels
            .iter()
            .filter(|reel| reel.iter().filter(|c| c.symbol == symbol).count() >= min)
            .count()
    }

    /// Copy of the board with symbols substituted per `map`; multipliers are kept
    pub fn map_symbols(&self, map: &BTreeMap<Symbol, Symbol>) -> Board {
        if map.is_empty() {
            return self.clone();
        }
        let reels = self
            .reels
            .iter()
            .map(|reel| {
                reel.iter()
                    .map(|cell| Cell {
                        symbol: map.get(&cell.symbol).copied().unwrap_or(cell.symbol),
                        multiplier: cell.multiplier,
                    })
                    .collect()
            })
            .collect();
        Board { reels }
    }

    /// Positions whose symbol differs from `other` (same dimensions assumed)
    pub fn diff_positions(&self, other: &Board) -> Vec<Position> {
        self.cells()
            .filter(|((reel, row), cell)| {
                other
                    .get(*reel as usize, *row as usize)
                    .is_some_and(|o| o.symbol != cell.symbol)
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Reel-major symbol codes for events
    pub fn to_codes(&self) -> Vec<Vec<String>> {
        self.reels
            .iter()
            .map(|reel| reel.iter().map(|c| c.symbol.code().to_string()).collect())
            .collect()
    }
}
