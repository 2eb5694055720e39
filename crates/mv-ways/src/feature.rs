//! Spin features: strategy hooks the orchestrator calls on every spin
//!
//! The engine does not know about collectors or upgrades. It hands each
//! registered [`SpinFeature`] the drawn board before evaluation and the wins
//! after it; the collector mechanic is one such feature.

use mv_stage::{CollectionEvent, EventBook, GameEvent, TransformationEvent};

use crate::board::Board;
use crate::collector::{CollectorState, SecurityLevel, TransformationTable};
use crate::spin::GameMode;
use crate::symbols::Symbol;
use crate::ways::WayWin;

/// What a feature sees about the spin in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinContext {
    pub mode: GameMode,
    /// 0 for the base spin, 1.. for free spins
    pub spin_index: u32,
    pub bet: f64,
}

/// Feature state reported into each spin outcome
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSnapshot {
    pub collector_count: u32,
    pub active_transformations: Vec<String>,
}

impl FeatureSnapshot {
    /// Fold another feature's snapshot into this one
    pub fn merge(&mut self, other: FeatureSnapshot) {
        self.collector_count += other.collector_count;
        self.active_transformations.extend(other.active_transformations);
    }
}

/// Hooks invoked by the spin orchestrator.
///
/// ## Lifecycle
///
/// 1. `on_session_start()`: a bonus session begins
/// 2. `transform()`: per spin, before evaluation
/// 3. `adjust_wins()`: per spin, after evaluation
/// 4. `on_session_end()`: free spins exhausted or win cap reached
pub trait SpinFeature {
    /// Feature name for logs
    fn name(&self) -> &str;

    fn on_session_start(&mut self) {}

    fn on_session_end(&mut self) {}

    /// Board to evaluate. Returning `None` leaves the board as drawn.
    fn transform(&mut self, _ctx: &SpinContext, _board: &Board, _book: &mut EventBook) -> Option<Board> {
        None
    }

    /// Post-evaluation payout adjustments
    fn adjust_wins(&self, _ctx: &SpinContext, _wins: &mut [WayWin]) {}

    fn snapshot(&self) -> FeatureSnapshot {
        FeatureSnapshot::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTOR FEATURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Banks collector symbols during free spins and applies the upgrades they unlock
#[derive(Debug, Clone)]
pub struct CollectorFeature<'a> {
    state: CollectorState<'a>,
}

impl<'a> CollectorFeature<'a> {
    pub fn new(table: &'a TransformationTable) -> Self {
        Self {
            state: CollectorState::new(table),
        }
    }

    pub fn state(&self) -> &CollectorState<'a> {
        &self.state
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.state.security_level()
    }
}

impl SpinFeature for CollectorFeature<'_> {
    fn name(&self) -> &str {
        "collector"
    }

    fn on_session_start(&mut self) {
        self.state.reset();
    }

    fn on_session_end(&mut self) {
        log::debug!(
            "Collector session ended at {} collected, level {}",
            self.state.collected(),
            self.state.level()
        );
        self.state.reset();
    }

    fn transform(&mut self, ctx: &SpinContext, board: &Board, book: &mut EventBook) -> Option<Board> {
        if ctx.mode != GameMode::Free {
            return None;
        }

        // Scan the drawn board first; thresholds use this spin's collectors
        let positions = board.positions_of(Symbol::Collector);
        let collected = positions.len() as u32;
        let previous = self.state.collected();
        let fired = self.state.collect(collected);

        if collected > 0 {
            book.push(GameEvent::CollectorCollection(CollectionEvent {
                previous_count: previous,
                new_count: self.state.collected(),
                collected,
                positions,
            }));
        }

        let transformed = self.state.apply(board);

        for rule in fired {
            book.push(GameEvent::SymbolTransformation(TransformationEvent {
                threshold: rule.threshold,
                transformation: rule.label.clone(),
                positions: rule.affected_positions(board, &transformed),
                collector_count: self.state.collected(),
            }));
        }

        Some(transformed)
    }

    fn adjust_wins(&self, ctx: &SpinContext, wins: &mut [WayWin]) {
        if ctx.mode != GameMode::Free {
            return;
        }
        let boost = self.state.top_tier_boost();
        if boost == 1.0 {
            return;
        }
        for win in wins.iter_mut().filter(|w| w.symbol == Symbol::TOP_TIER) {
            win.payout *= boost;
        }
    }

    fn snapshot(&self) -> FeatureSnapshot {
        FeatureSnapshot {
            collector_count: self.state.collected(),
            active_transformations: self.state.active_labels(),
        }
    }
}
