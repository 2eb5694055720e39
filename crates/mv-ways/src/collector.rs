//! Collector / transformation state machine
//!
//! During a bonus session every collector symbol that lands is banked. Each
//! rule in the [`TransformationTable`] fires the first time the banked total
//! reaches its threshold and then stays active until the session ends.
//!
//! ```text
//! collected:  0 ──► 4 ──────► 7 ──────► 13 ──────► 15
//! fires:          H4_TO_H1  H3_TO_H1  H2_TO_H1   INFINITE_BREACH (H1 ×2)
//! level:      0     1         2         3          4
//! ```

use std::collections::BTreeMap;

use mv_stage::Position;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{SlotError, SlotResult};
use crate::symbols::Symbol;

// ═══════════════════════════════════════════════════════════════════════════════
// RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// What a rule does once active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformEffect {
    /// Every `from` on the board becomes `to`
    Upgrade { from: Symbol, to: Symbol },
    /// Top-tier payouts are multiplied by `factor`
    BoostTopTier { factor: f64 },
}

/// One threshold rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRule {
    /// Banked collector count at which the rule fires
    pub threshold: u32,
    /// Stable name carried in events (e.g. `H4_TO_H1`)
    pub label: String,
    pub effect: TransformEffect,
}

impl TransformRule {
    pub fn upgrade(threshold: u32, from: Symbol, to: Symbol) -> Self {
        Self {
            threshold,
            label: format!("{}_TO_{}", from.code(), to.code()),
            effect: TransformEffect::Upgrade { from, to },
        }
    }

    pub fn boost(threshold: u32, label: impl Into<String>, factor: f64) -> Self {
        Self {
            threshold,
            label: label.into(),
            effect: TransformEffect::BoostTopTier { factor },
        }
    }

    /// Cells touched by this rule: upgraded cells on the drawn board, or
    /// boosted top-tier cells on the evaluated board
    pub fn affected_positions(&self, original: &Board, transformed: &Board) -> Vec<Position> {
        match self.effect {
            TransformEffect::Upgrade { from, .. } => original.positions_of(from),
            TransformEffect::BoostTopTier { .. } => transformed.positions_of(Symbol::TOP_TIER),
        }
    }
}

/// Ordered rule list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformationTable {
    rules: Vec<TransformRule>,
}

impl Default for TransformationTable {
    fn default() -> Self {
        Self {
            rules: vec![
                TransformRule::upgrade(4, Symbol::H4, Symbol::H1),
                TransformRule::upgrade(7, Symbol::H3, Symbol::H1),
                TransformRule::upgrade(13, Symbol::H2, Symbol::H1),
                TransformRule::boost(15, "INFINITE_BREACH", 2.0),
            ],
        }
    }
}

impl TransformationTable {
    pub fn new(rules: Vec<TransformRule>) -> SlotResult<Self> {
        let table = Self { rules };
        table.validate()?;
        Ok(table)
    }

    pub fn rules(&self) -> &[TransformRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Thresholds must be positive and non-decreasing; effects must be sane
    pub fn validate(&self) -> SlotResult<()> {
        let mut previous = 0;
        for rule in &self.rules {
            if rule.threshold == 0 || rule.threshold < previous {
                return Err(SlotError::InvalidConfig(format!(
                    "transformation '{}' threshold {} is out of order",
                    rule.label, rule.threshold
                )));
            }
            previous = rule.threshold;

            match rule.effect {
                TransformEffect::Upgrade { from, to } => {
                    if from == to || !from.accepts_wild() || !to.accepts_wild() {
                        return Err(SlotError::InvalidConfig(format!(
                            "transformation '{}' cannot upgrade {} to {}",
                            rule.label, from, to
                        )));
                    }
                }
                TransformEffect::BoostTopTier { factor } => {
                    if !factor.is_finite() || factor <= 0.0 {
                        return Err(SlotError::InvalidConfig(format!(
                            "transformation '{}' has invalid factor {}",
                            rule.label, factor
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECURITY LEVEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Frontend display tier for the transformation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityLevel {
    Cyan,
    Blue,
    Purple,
    Red,
    Infinite,
}

impl SecurityLevel {
    pub fn from_level(level: usize) -> Self {
        match level {
            0 => Self::Cyan,
            1 => Self::Blue,
            2 => Self::Purple,
            3 => Self::Red,
            _ => Self::Infinite,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-session collector total and the set of rules already fired
#[derive(Debug, Clone)]
pub struct CollectorState<'a> {
    table: &'a TransformationTable,
    collected: u32,
    active: Vec<bool>,
}

impl<'a> CollectorState<'a> {
    pub fn new(table: &'a TransformationTable) -> Self {
        Self {
            table,
            collected: 0,
            active: vec![false; table.len()],
        }
    }

    /// Start a fresh session: counter zero, nothing active
    pub fn reset(&mut self) {
        self.collected = 0;
        self.active.iter_mut().for_each(|a| *a = false);
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    /// Bank `count` collectors and return the rules that fired just now, in table order
    pub fn collect(&mut self, count: u32) -> Vec<&'a TransformRule> {
        self.collected = self.collected.saturating_add(count);

        let table = self.table;
        let mut fired = Vec::new();
        for (index, rule) in table.rules().iter().enumerate() {
            if !self.active[index] && self.collected >= rule.threshold {
                self.active[index] = true;
                log::debug!(
                    "Transformation {} active at {} collected",
                    rule.label,
                    self.collected
                );
                fired.push(rule);
            }
        }
        fired
    }

    /// Rules active this session
    pub fn active_rules(&self) -> impl Iterator<Item = &'a TransformRule> + '_ {
        let table = self.table;
        table
            .rules()
            .iter()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .map(|(rule, _)| rule)
    }

    pub fn active_labels(&self) -> Vec<String> {
        self.active_rules().map(|r| r.label.clone()).collect()
    }

    /// Number of rules fired this session
    pub fn level(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn security_level(&self) -> SecurityLevel {
        SecurityLevel::from_level(self.level())
    }

    /// Symbol substitutions from every active upgrade
    pub fn substitution_map(&self) -> BTreeMap<Symbol, Symbol> {
        self.active_rules()
            .filter_map(|rule| match rule.effect {
                TransformEffect::Upgrade { from, to } => Some((from, to)),
                TransformEffect::BoostTopTier { .. } => None,
            })
            .collect()
    }

    /// Transformed copy of `board`; the original is left untouched
    pub fn apply(&self, board: &Board) -> Board {
        board.map_symbols(&self.substitution_map())
    }

    /// Combined factor applied to top-tier payouts
    pub fn top_tier_boost(&self) -> f64 {
        self.active_rules()
            .filter_map(|rule| match rule.effect {
                TransformEffect::BoostTopTier { factor } => Some(factor),
                TransformEffect::Upgrade { .. } => None,
            })
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progression_fires_each_rule_once() {
        let table = TransformationTable::default();
        let mut state = CollectorState::new(&table);

        let mut labels = Vec::new();
        for step in [4, 3, 6, 2] {
            labels.extend(state.collect(step).into_iter().map(|r| r.label.clone()));
        }
        assert_eq!(state.collected(), 15);
        assert_eq!(labels, vec!["H4_TO_H1", "H3_TO_H1", "H2_TO_H1", "INFINITE_BREACH"]);

        // Further collection never re-fires
        assert!(state.collect(10).is_empty());
        assert_eq!(state.level(), 4);
        assert_eq!(state.security_level(), SecurityLevel::Infinite);
    }

    #[test]
    fn test_jump_fires_all_crossed_rules_in_order() {
        let table = TransformationTable::default();
        let mut state = CollectorState::new(&table);

        let fired: Vec<u32> = state.collect(13).iter().map(|r| r.threshold).collect();
        assert_eq!(fired, vec![4, 7, 13]);
        assert_eq!(state.security_level(), SecurityLevel::Red);
    }

    #[test]
    fn test_rules_stay_active_until_reset() {
        let table = TransformationTable::default();
        let mut state = CollectorState::new(&table);
        state.collect(5);

        for _ in 0..3 {
            assert!(state.collect(0).is_empty());
            assert_eq!(state.active_labels(), vec!["H4_TO_H1"]);
        }

        state.reset();
        assert_eq!(state.collected(), 0);
        assert_eq!(state.level(), 0);
        assert!(state.substitution_map().is_empty());
    }

    #[test]
    fn test_apply_upgrades_and_preserves_original() {
        let table = TransformationTable::default();
        let mut state = CollectorState::new(&table);
        state.collect(7);

        let original = Board::parse(&["H4 H3 H2", "3X H4 L1"]).unwrap();
        let transformed = state.apply(&original);

        assert_eq!(transformed.to_codes(), vec![vec!["H1", "H1", "H2"], vec!["3X", "H1", "L1"]]);
        assert_eq!(transformed.reel(1)[0].multiplier, Some(3));
        assert_eq!(original.count(Symbol::H4), 2);
        assert_eq!(state.top_tier_boost(), 1.0);

        let rule = &table.rules()[0];
        assert_eq!(rule.affected_positions(&original, &transformed), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn test_boost_after_final_threshold() {
        let table = TransformationTable::default();
        let mut state = CollectorState::new(&table);
        state.collect(14);
        assert_eq!(state.top_tier_boost(), 1.0);
        state.collect(1);
        assert_eq!(state.top_tier_boost(), 2.0);
    }

    #[test]
    fn test_table_validation() {
        assert!(TransformationTable::default().validate().is_ok());
        assert!(
            TransformationTable::new(vec![
                TransformRule::upgrade(7, Symbol::H3, Symbol::H1),
                TransformRule::upgrade(4, Symbol::H4, Symbol::H1),
            ])
            .is_err()
        );
        assert!(TransformationTable::new(vec![TransformRule::upgrade(4, Symbol::Scatter, Symbol::H1)]).is_err());
        assert!(TransformationTable::new(vec![TransformRule::boost(4, "X", 0.0)]).is_err());
    }

    #[test]
    fn test_security_level_names() {
        assert_eq!(serde_json::to_string(&SecurityLevel::Purple).unwrap(), "\"PURPLE\"");
        assert_eq!(SecurityLevel::from_level(9), SecurityLevel::Infinite);
    }
}
