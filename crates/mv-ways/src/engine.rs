//! Spin Engine: sequences spins and bonus sessions
//!
//! One round is a base spin plus, when enough scatters land, a bonus session
//! of free spins played strictly in order:
//!
//! ```text
//! draw ──► features.transform ──► evaluate ──► features.adjust_wins
//!      ──► scatter award ──► win-cap check ──► next free spin / end
//! ```

use mv_stage::{EventBook, FreeSpinTriggerEvent, GameEvent, RevealEvent};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::SlotResult;
use crate::feature::{CollectorFeature, FeatureSnapshot, SpinContext, SpinFeature};
use crate::generator::BoardGenerator;
use crate::spin::{GameMode, RoundResult, SpinOutcome};
use crate::symbols::Symbol;
use crate::ways::total_payout;

/// Plays rounds against a borrowed configuration
pub struct SpinEngine<'a> {
    config: &'a GameConfig,
    base_generator: BoardGenerator,
    free_generator: BoardGenerator,
    features: Vec<Box<dyn SpinFeature + 'a>>,
    rng: ChaCha8Rng,
}

impl<'a> SpinEngine<'a> {
    /// Engine seeded from the OS, with the collector feature registered
    pub fn new(config: &'a GameConfig) -> SlotResult<Self> {
        Self::with_rng(config, ChaCha8Rng::from_os_rng())
    }

    /// Engine drawing from an explicit stream
    pub fn with_rng(config: &'a GameConfig, rng: ChaCha8Rng) -> SlotResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            base_generator: config.generator(GameMode::Base)?,
            free_generator: config.generator(GameMode::Free)?,
            features: vec![Box::new(CollectorFeature::new(&config.transformations))],
            rng,
        })
    }

    /// Reseed (builder)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed(seed);
        self
    }

    /// Register an additional feature; features run in registration order
    pub fn with_feature(mut self, feature: Box<dyn SpinFeature + 'a>) -> Self {
        self.features.push(feature);
        self
    }

    /// Reseed for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUNDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Play one round with a drawn base board
    pub fn play_round(&mut self, bet: f64) -> RoundResult {
        let board = self.base_generator.generate(&mut self.rng);
        self.play_round_from(board, bet)
    }

    /// Play one round whose base spin lands on `board`; free spins are drawn
    pub fn play_round_from(&mut self, board: Board, bet: f64) -> RoundResult {
        let cap = self.config.wincap_amount(bet);
        let mut book = EventBook::new();

        let mut base = self.run_spin(board, GameMode::Base, 0, bet, &mut book);
        let mut round_win = base.total_win;
        let mut wincap_hit = false;

        if round_win >= cap {
            round_win = cap;
            wincap_hit = true;
        } else {
            base.free_spins_awarded = self.award(GameMode::Base, base.scatter_count, 0, &mut book);
        }

        let mut total_awarded = base.free_spins_awarded;
        let mut free_spins = Vec::with_capacity(total_awarded as usize);
        let mut final_collector_count = 0;

        if total_awarded > 0 {
            log::debug!(
                "Bonus triggered by {} scatters: {} free spins",
                base.scatter_count,
                total_awarded
            );
            self.start_session();

            let mut remaining = total_awarded;
            let mut index = 1;
            while remaining > 0 {
                remaining -= 1;
                let board = self.free_generator.generate(&mut self.rng);
                let mut spin = self.run_spin(board, GameMode::Free, index, bet, &mut book);
                round_win += spin.total_win;

                if round_win >= cap {
                    log::debug!("Win cap reached on free spin {} with {} remaining", index, remaining);
                    round_win = cap;
                    wincap_hit = true;
                    free_spins.push(spin);
                    break;
                }

                let extra = self.award(GameMode::Free, spin.scatter_count, total_awarded, &mut book);
                spin.free_spins_awarded = extra;
                total_awarded += extra;
                remaining += extra;

                free_spins.push(spin);
                index += 1;
            }

            final_collector_count = self.snapshot().collector_count;
            self.end_session();
        }

        RoundResult {
            bet,
            base,
            free_spins,
            total_win: round_win,
            wincap_hit,
            free_spins_awarded: total_awarded,
            final_collector_count,
            events: book,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FORCED SPINS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Begin a bonus session: every feature resets its session state
    pub fn start_session(&mut self) {
        for feature in &mut self.features {
            feature.on_session_start();
        }
    }

    /// End the current bonus session
    pub fn end_session(&mut self) {
        for feature in &mut self.features {
            feature.on_session_end();
        }
    }

    /// Evaluate an explicit board as one spin of `mode`.
    ///
    /// Free-mode spins carry session state forward; call
    /// [`start_session`](Self::start_session) to begin a fresh one.
    pub fn spin_board(&mut self, board: Board, mode: GameMode, bet: f64, book: &mut EventBook) -> SpinOutcome {
        self.run_spin(board, mode, 0, bet, book)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn run_spin(
        &mut self,
        original: Board,
        mode: GameMode,
        index: u32,
        bet: f64,
        book: &mut EventBook,
    ) -> SpinOutcome {
        let ctx = SpinContext {
            mode,
            spin_index: index,
            bet,
        };

        let mut board = original.clone();
        for feature in &mut self.features {
            if let Some(next) = feature.transform(&ctx, &board, book) {
                board = next;
            }
        }

        let reveal = self.config.reveal;
        let stacks = board.stack_count(Symbol::TOP_TIER, reveal.stack_height as usize);
        if stacks >= reveal.min_stacks as usize {
            book.push(GameEvent::Reveal(RevealEvent {
                h1_stack_count: stacks.min(u8::MAX as usize) as u8,
                trigger_screen_shake: true,
            }));
        }

        let mut wins = self.config.evaluator().evaluate(&board, bet);
        for feature in &self.features {
            feature.adjust_wins(&ctx, &mut wins);
        }

        let snapshot = self.snapshot();
        let scatter_count = original.count(Symbol::Scatter).min(u8::MAX as usize) as u8;

        let outcome = SpinOutcome {
            index,
            mode,
            total_win: total_payout(&wins),
            original_board: original,
            board,
            wins,
            collector_count: snapshot.collector_count,
            active_transformations: snapshot.active_transformations,
            scatter_count,
            free_spins_awarded: 0,
        };
        book.push(GameEvent::SpinResult(outcome.to_event()));
        outcome
    }

    /// Free spins granted for `scatters`, limited by the session cap
    fn award(&self, mode: GameMode, scatters: u8, awarded_so_far: u32, book: &mut EventBook) -> u32 {
        let raw = self.config.free_spins_for(mode, scatters);
        if raw == 0 {
            return 0;
        }

        let granted = raw.min(self.config.max_freespins.saturating_sub(awarded_so_far));
        let retrigger = mode == GameMode::Free;
        if retrigger {
            log::debug!("Retrigger: {} scatters, +{} spins ({} requested)", scatters, granted, raw);
        }

        book.push(GameEvent::FreeSpinTrigger(FreeSpinTriggerEvent {
            scatter_count: scatters,
            awarded: granted,
            total_awarded: awarded_so_far + granted,
            retrigger,
        }));
        granted
    }

    fn snapshot(&self) -> FeatureSnapshot {
        let mut snapshot = FeatureSnapshot::default();
        for feature in &self.features {
            snapshot.merge(feature.snapshot());
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BET: f64 = 1.0;

    fn three_scatter_board() -> Board {
        Board::parse(&[
            "S L1 L2 L3",
            "L4 S L6 L1",
            "L2 L3 S L4",
            "L6 L1 L2 L3",
            "L4 L6 L1 L2",
        ])
        .unwrap()
    }

    #[test]
    fn test_seeded_rounds_are_reproducible() {
        let config = GameConfig::default();
        let mut a = SpinEngine::new(&config).unwrap().with_seed(42);
        let mut b = SpinEngine::new(&config).unwrap().with_seed(42);

        for _ in 0..200 {
            assert_eq!(a.play_round(BET), b.play_round(BET));
        }
    }

    #[test]
    fn test_base_spin_has_no_collector_activity() {
        let config = GameConfig::default();
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(1);

        for _ in 0..200 {
            let round = engine.play_round(BET);
            assert_eq!(round.base.mode, GameMode::Base);
            assert_eq!(round.base.collector_count, 0);
            assert_eq!(round.base.original_board, round.base.board);
        }
    }

    #[test]
    fn test_forced_trigger_plays_whole_session() {
        let config = GameConfig::default();
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(9);
        let round = engine.play_round_from(three_scatter_board(), BET);

        assert!(round.triggered_bonus());
        assert_eq!(round.base.free_spins_awarded, 8);
        assert!(round.free_spins_awarded <= config.max_freespins);
        if !round.wincap_hit {
            assert_eq!(round.free_spins_played() as u32, round.free_spins_awarded);
        }
        for (i, spin) in round.free_spins.iter().enumerate() {
            assert_eq!(spin.mode, GameMode::Free);
            assert_eq!(spin.index, i as u32 + 1);
        }

        let triggers = round.events.of_type("freeSpinTrigger").count();
        assert!(triggers >= 1);
        assert_eq!(round.events.of_type("spinResult").count(), 1 + round.free_spins_played());
    }

    #[test]
    fn test_round_total_is_capped() {
        let config = GameConfig {
            wincap: 0.1,
            ..GameConfig::default()
        };
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(2);

        let board = Board::parse(&[
            "H1 S L1 L1",
            "H1 S L2 L2",
            "H1 S L3 L3",
            "H1 L4 L4 L4",
            "H1 L6 L6 L6",
        ])
        .unwrap();
        let round = engine.play_round_from(board, 2.0);

        assert!(round.wincap_hit);
        assert_eq!(round.total_win, 0.2);
        assert!(round.free_spins.is_empty());
        assert_eq!(round.free_spins_awarded, 0);
    }

    #[test]
    fn test_session_cap_limits_awards() {
        let mut config = GameConfig::default();
        config.max_freespins = 10;
        config.free_weights = [(Symbol::Scatter, 1), (Symbol::L1, 1)].into_iter().collect();
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(5);

        let round = engine.play_round_from(three_scatter_board(), BET);
        assert_eq!(round.free_spins_awarded, 10);
        assert_eq!(round.free_spins_played(), 10);
    }

    #[test]
    fn test_win_cap_mid_session_ends_round() {
        let config = GameConfig {
            wincap: 3.0,
            free_weights: [(Symbol::H1, 1)].into_iter().collect(),
            ..GameConfig::default()
        };
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(3);
        let round = engine.play_round_from(three_scatter_board(), BET);

        assert_eq!(round.base.total_win, 0.0);
        assert_eq!(round.free_spins_awarded, 8);
        assert_eq!(round.free_spins_played(), 1);
        assert!(round.wincap_hit);
        assert_eq!(round.total_win, 3.0);
        assert_eq!(round.events.of_type("spinResult").count(), 2);
    }

    #[test]
    fn test_two_scatters_retrigger_only_in_free_spins() {
        let config = GameConfig::default();
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(4);

        let two_scatters = Board::parse(&[
            "S L1 L2 L3",
            "L4 S L6 L1",
            "L2 L3 L6 L4",
            "L6 L1 L2 L3",
            "L4 L6 L1 L2",
        ])
        .unwrap();
        let round = engine.play_round_from(two_scatters, BET);
        assert!(!round.triggered_bonus());
        assert_eq!(round.events.of_type("freeSpinTrigger").count(), 0);

        let mut book = EventBook::new();
        assert_eq!(engine.award(GameMode::Base, 2, 0, &mut book), 0);
        assert_eq!(engine.award(GameMode::Free, 2, 8, &mut book), 5);
        assert_eq!(
            book.iter().collect::<Vec<_>>(),
            vec![&GameEvent::FreeSpinTrigger(FreeSpinTriggerEvent {
                scatter_count: 2,
                awarded: 5,
                total_awarded: 13,
                retrigger: true,
            })]
        );
    }

    #[test]
    fn test_free_spin_scatters_extend_the_session() {
        let config = GameConfig {
            free_weights: [(Symbol::Scatter, 1), (Symbol::L1, 1)].into_iter().collect(),
            ..GameConfig::default()
        };
        let mut engine = SpinEngine::new(&config).unwrap().with_seed(6);
        let round = engine.play_round_from(three_scatter_board(), BET);

        assert!(round.free_spins_awarded > 8);
        assert!(round.free_spins_awarded <= config.max_freespins);
        assert!(round.free_spins.iter().any(|s| s.free_spins_awarded > 0));
        assert!(
            round
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::FreeSpinTrigger(t) if t.retrigger))
        );
    }

    #[test]
    fn test_forced_free_spins_drive_transformations() {
        let config = GameConfig::default();
        let mut engine = SpinEngine::new(&config).unwrap();
        engine.start_session();
        let mut book = EventBook::new();

        let boards = [
            "G G G G L1 L1 L1 L1 L2 L2 L2 L2 L3 L3 L3 L3 L4 L4 L4 L4",
            "G G G L1 L1 L1 L1 L1 L2 L2 L2 L2 L3 L3 L3 L3 L4 L4 L4 L4",
            "G G G G G G L1 L1 L2 L2 L2 L2 L3 L3 L3 L3 L4 L4 L4 L4",
            "G G L1 L1 L1 L1 L1 L1 L2 L2 L2 L2 L3 L3 L3 L3 L4 L4 L4 L4",
        ];
        let mut counts = Vec::new();
        for codes in boards {
            let tokens: Vec<&str> = codes.split(' ').collect();
            let reels: Vec<String> = tokens.chunks(4).map(|c| c.join(" ")).collect();
            let reels: Vec<&str> = reels.iter().map(String::as_str).collect();
            let outcome = engine.spin_board(Board::parse(&reels).unwrap(), GameMode::Free, BET, &mut book);
            counts.push(outcome.collector_count);
        }

        assert_eq!(counts, vec![4, 7, 13, 15]);
        let thresholds: Vec<u32> = book
            .iter()
            .filter_map(|e| match e {
                GameEvent::SymbolTransformation(t) => Some(t.threshold),
                _ => None,
            })
            .collect();
        assert_eq!(thresholds, vec![4, 7, 13, 15]);
    }

    #[test]
    fn test_reveal_on_three_stacks() {
        let config = GameConfig::default();
        let mut engine = SpinEngine::new(&config).unwrap();
        let mut book = EventBook::new();

        let board = Board::parse(&[
            "H1 H1 H1 L1",
            "H1 H1 H1 L2",
            "H1 H1 H1 L3",
            "L4 L4 L4 L4",
            "L6 L6 L6 L6",
        ])
        .unwrap();
        engine.spin_board(board, GameMode::Base, BET, &mut book);

        assert_eq!(
            book.of_type("reveal").next(),
            Some(&GameEvent::Reveal(RevealEvent {
                h1_stack_count: 3,
                trigger_screen_shake: true,
            }))
        );
    }
}
