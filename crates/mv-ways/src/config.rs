//! Game configuration
//!
//! A `GameConfig` is built once (defaults, YAML or JSON), validated, and then
//! passed by reference to everything that needs it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collector::TransformationTable;
use crate::error::{SlotError, SlotResult};
use crate::generator::{BoardGenerator, ReelStrip};
use crate::paytable::PayTable;
use crate::spin::GameMode;
use crate::symbols::Symbol;
use crate::ways::WaysEvaluator;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Visible rows per reel
    pub rows: u8,
}

impl GridSpec {
    pub fn new(reels: u8, rows: u8) -> Self {
        Self { reels, rows }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }

    /// Ways on a full screen (rows ^ reels)
    pub fn max_ways(&self) -> u64 {
        (self.rows as u64).saturating_pow(self.reels as u32)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::new(5, 4)
    }
}

/// Top-tier stack reveal: `min_stacks` reels holding `stack_height`+ top-tier symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRule {
    pub stack_height: u8,
    pub min_stacks: u8,
}

impl Default for RevealRule {
    fn default() -> Self {
        Self {
            stack_height: 3,
            min_stacks: 3,
        }
    }
}

/// Complete math configuration for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub name: String,
    pub grid: GridSpec,
    pub paytable: PayTable,

    /// Per-cell distribution for base spins
    pub base_weights: BTreeMap<Symbol, u32>,
    /// Per-cell distribution for free spins
    pub free_weights: BTreeMap<Symbol, u32>,
    /// Optional reel strips per mode; replaces the weighted draw for that mode
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reel_strips: BTreeMap<GameMode, Vec<Vec<Symbol>>>,

    /// Multiplier carried by each wild variant
    pub wild_multipliers: BTreeMap<Symbol, u32>,
    /// Free-spin draw weights for upgrading plain wilds
    pub wild_weights: BTreeMap<Symbol, u32>,

    pub transformations: TransformationTable,

    /// Scatter count → spins awarded, per mode
    pub freespin_triggers: BTreeMap<GameMode, BTreeMap<u8, u32>>,
    /// Most free spins one session can award
    pub max_freespins: u32,
    /// Round win cap as a multiple of bet
    pub wincap: f64,

    pub reveal: RevealRule,
}

impl Default for GameConfig {
    fn default() -> Self {
        let base_weights = BTreeMap::from([
            (Symbol::H1, 2),
            (Symbol::H2, 4),
            (Symbol::H3, 5),
            (Symbol::H4, 6),
            (Symbol::L1, 8),
            (Symbol::L2, 10),
            (Symbol::L3, 12),
            (Symbol::L4, 14),
            (Symbol::L6, 16),
            (Symbol::Wild, 3),
            (Symbol::Scatter, 2),
        ]);

        let mut free_weights = base_weights.clone();
        free_weights.insert(Symbol::Wild, 5);
        free_weights.insert(Symbol::Collector, 3);

        Self {
            name: "meta_vault".into(),
            grid: GridSpec::default(),
            paytable: PayTable::standard(),
            base_weights,
            free_weights,
            reel_strips: BTreeMap::new(),
            wild_multipliers: BTreeMap::from([(Symbol::Wild, 1), (Symbol::Wild2x, 2), (Symbol::Wild3x, 3)]),
            wild_weights: BTreeMap::from([(Symbol::Wild2x, 60), (Symbol::Wild3x, 40)]),
            transformations: TransformationTable::default(),
            freespin_triggers: BTreeMap::from([
                (GameMode::Base, BTreeMap::from([(3, 8), (4, 15), (5, 20)])),
                (GameMode::Free, BTreeMap::from([(2, 5), (3, 8), (4, 12), (5, 15)])),
            ]),
            max_freespins: 125,
            wincap: 50_000.0,
            reveal: RevealRule::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_yaml_str(&text)?,
        };
        log::info!("Loaded game config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> SlotResult<String> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Run every construction-time check
    pub fn validate(&self) -> SlotResult<()> {
        if self.grid.reels == 0 || self.grid.rows == 0 {
            return Err(SlotError::InvalidConfig(format!(
                "grid must be at least 1×1, got {}×{}",
                self.grid.reels, self.grid.rows
            )));
        }

        self.paytable.validate()?;
        self.transformations.validate()?;

        for (symbol, value) in &self.wild_multipliers {
            if !symbol.is_wild() || *value == 0 {
                return Err(SlotError::InvalidConfig(format!(
                    "wild multiplier {}={} is invalid",
                    symbol, value
                )));
            }
        }

        if self.max_freespins == 0 {
            return Err(SlotError::InvalidConfig("max_freespins must be positive".into()));
        }
        if !self.wincap.is_finite() || self.wincap <= 0.0 {
            return Err(SlotError::InvalidConfig(format!("invalid wincap {}", self.wincap)));
        }

        for (mode, table) in &self.freespin_triggers {
            if table.keys().any(|&count| count == 0) {
                return Err(SlotError::InvalidConfig(format!(
                    "{} trigger table has a zero scatter count",
                    mode.name()
                )));
            }
        }

        // Building both generators checks weights, strips and wild weights
        self.generator(GameMode::Base)?;
        self.generator(GameMode::Free)?;
        Ok(())
    }

    /// Board generator for a mode
    pub fn generator(&self, mode: GameMode) -> SlotResult<BoardGenerator> {
        let reels = self.grid.reels as usize;
        let rows = self.grid.rows as usize;

        let generator = match self.reel_strips.get(&mode) {
            Some(strips) => BoardGenerator::from_strips(
                reels,
                rows,
                strips.iter().cloned().map(ReelStrip::new).collect(),
            )?,
            None => {
                let weights = match mode {
                    GameMode::Base => &self.base_weights,
                    GameMode::Free => &self.free_weights,
                };
                BoardGenerator::weighted(reels, rows, weights)?
            }
        };

        let generator = generator.with_wild_values(&self.wild_multipliers);
        match mode {
            GameMode::Base => Ok(generator),
            GameMode::Free => generator.with_wild_upgrade(&self.wild_weights),
        }
    }

    pub fn evaluator(&self) -> WaysEvaluator<'_> {
        WaysEvaluator::new(&self.paytable)
    }

    /// Smallest scatter count that awards spins in `mode`
    pub fn min_trigger(&self, mode: GameMode) -> Option<u8> {
        self.freespin_triggers
            .get(&mode)
            .and_then(|t| t.keys().next().copied())
    }

    /// Spins awarded for `scatters` in `mode`.
    ///
    /// Counts above the table's highest key award that key's entry instead of
    /// nothing, so six or more scatters never pay less than five.
    pub fn free_spins_for(&self, mode: GameMode, scatters: u8) -> u32 {
        self.freespin_triggers
            .get(&mode)
            .and_then(|t| t.range(..=scatters).next_back())
            .map(|(_, &spins)| spins)
            .unwrap_or(0)
    }

    /// Round cap in currency for `bet`
    pub fn wincap_amount(&self, bet: f64) -> f64 {
        self.wincap * bet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.grid.max_ways(), 1024);
        assert_eq!(config.max_freespins, 125);
        assert!(!config.base_weights.contains_key(&Symbol::Collector));
        assert!(config.free_weights.contains_key(&Symbol::Collector));
    }

    #[test]
    fn test_trigger_tables() {
        let config = GameConfig::default();
        assert_eq!(config.min_trigger(GameMode::Base), Some(3));
        assert_eq!(config.min_trigger(GameMode::Free), Some(2));

        assert_eq!(config.free_spins_for(GameMode::Base, 2), 0);
        assert_eq!(config.free_spins_for(GameMode::Base, 3), 8);
        assert_eq!(config.free_spins_for(GameMode::Base, 5), 20);
        assert_eq!(config.free_spins_for(GameMode::Base, 9), 20);
        assert_eq!(config.free_spins_for(GameMode::Free, 2), 5);
        assert_eq!(config.free_spins_for(GameMode::Free, 1), 0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = GameConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        let back = GameConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{"name": "lite", "max_freespins": 50, "wincap": 5000}"#).unwrap();
        assert_eq!(config.name, "lite");
        assert_eq!(config.max_freespins, 50);
        assert_eq!(config.paytable, PayTable::standard());
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut config = GameConfig::default();
        config.base_weights.insert(Symbol::L1, 0);
        assert!(matches!(config.validate(), Err(SlotError::InvalidWeight { .. })));

        let mut config = GameConfig::default();
        config.free_weights.clear();
        assert!(matches!(config.validate(), Err(SlotError::EmptyDistribution)));

        let mut config = GameConfig::default();
        config.reel_strips.insert(GameMode::Base, vec![vec![Symbol::H1]; 4]);
        assert!(matches!(
            config.validate(),
            Err(SlotError::ReelCountMismatch { expected: 5, actual: 4 })
        ));

        let mut config = GameConfig::default();
        config.wincap = 0.0;
        assert!(config.validate().is_err());

        assert!(GameConfig::from_yaml_str("grid: [1, 2, 3]").is_err());
    }

    #[test]
    fn test_strip_generator_for_one_mode() {
        let mut config = GameConfig::default();
        config
            .reel_strips
            .insert(GameMode::Free, vec![vec![Symbol::L1, Symbol::Wild, Symbol::Collector]; 5]);
        config.validate().unwrap();

        assert!(matches!(
            config.generator(GameMode::Free).unwrap().source(),
            crate::generator::SymbolSource::Strips(_)
        ));
        assert!(matches!(
            config.generator(GameMode::Base).unwrap().source(),
            crate::generator::SymbolSource::Weighted(_)
        ));
    }
}
