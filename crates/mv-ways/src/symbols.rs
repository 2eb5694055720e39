//! Symbol definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SlotError;

/// Symbol class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// High paying (H1 is top tier)
    High,
    /// Low paying
    Low,
    /// Wild - substitutes for every payable symbol
    Wild,
    /// Scatter - triggers free spins anywhere on the board
    Scatter,
    /// Collector - banked during free spins, drives upgrades
    Collector,
}

/// A symbol identity.
///
/// Serializes to its short code (`"H1"`, `"2X"`, `"S"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// The Architect - top tier, pays from 2 of a kind
    H1,
    /// Encryption Core
    H2,
    /// Cyber-Doberman
    H3,
    /// Access Card
    H4,
    L1,
    L2,
    L3,
    L4,
    /// Reserved - not on the standard reels
    L5,
    L6,
    /// Plain wild (×1)
    #[serde(rename = "W")]
    Wild,
    /// Multiplier wild (×2)
    #[serde(rename = "2X")]
    Wild2x,
    /// Multiplier wild (×3)
    #[serde(rename = "3X")]
    Wild3x,
    /// Access Key
    #[serde(rename = "S")]
    Scatter,
    /// Gold Vault
    #[serde(rename = "G")]
    Collector,
}

impl Symbol {
    /// Highest paying symbol; every upgrade targets it
    pub const TOP_TIER: Symbol = Symbol::H1;

    /// Every symbol, in paytable order
    pub const ALL: [Symbol; 15] = [
        Symbol::H1,
        Symbol::H2,
        Symbol::H3,
        Symbol::H4,
        Symbol::L1,
        Symbol::L2,
        Symbol::L3,
        Symbol::L4,
        Symbol::L5,
        Symbol::L6,
        Symbol::Wild,
        Symbol::Wild2x,
        Symbol::Wild3x,
        Symbol::Scatter,
        Symbol::Collector,
    ];

    /// Wild variants
    pub const WILDS: [Symbol; 3] = [Symbol::Wild, Symbol::Wild2x, Symbol::Wild3x];

    /// Short code used on the wire and in reel strips
    pub fn code(&self) -> &'static str {
        match self {
            Self::H1 => "H1",
            Self::H2 => "H2",
            Self::H3 => "H3",
            Self::H4 => "H4",
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::L5 => "L5",
            Self::L6 => "L6",
            Self::Wild => "W",
            Self::Wild2x => "2X",
            Self::Wild3x => "3X",
            Self::Scatter => "S",
            Self::Collector => "G",
        }
    }

    /// Symbol class
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::H1 | Self::H2 | Self::H3 | Self::H4 => SymbolKind::High,
            Self::L1 | Self::L2 | Self::L3 | Self::L4 | Self::L5 | Self::L6 => SymbolKind::Low,
            Self::Wild | Self::Wild2x | Self::Wild3x => SymbolKind::Wild,
            Self::Scatter => SymbolKind::Scatter,
            Self::Collector => SymbolKind::Collector,
        }
    }

    /// Is this any wild variant?
    pub fn is_wild(&self) -> bool {
        self.kind() == SymbolKind::Wild
    }

    /// Can a wild stand in for this symbol?
    ///
    /// Scatter and collector are never substituted; neither are wilds themselves.
    pub fn accepts_wild(&self) -> bool {
        matches!(self.kind(), SymbolKind::High | SymbolKind::Low)
    }

    /// Fixed multiplier carried by a wild variant
    pub fn wild_multiplier(&self) -> Option<u32> {
        match self {
            Self::Wild => Some(1),
            Self::Wild2x => Some(2),
            Self::Wild3x => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Symbol {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(symbol) = Self::ALL.iter().find(|sym| sym.code() == trimmed) {
            return Ok(*symbol);
        }
        // Long names used by the reel-strip tooling
        match trimmed {
            "W2X" => Ok(Self::Wild2x),
            "W3X" => Ok(Self::Wild3x),
            "Scatter" => Ok(Self::Scatter),
            "Collector" => Ok(Self::Collector),
            _ => Err(SlotError::UnknownSymbol(trimmed.to_string())),
        }
    }
}
