//! Ways Math Integration Tests
//!
//! Verifies the evaluator, collector session and round sequencing through the
//! public API:
//! - Top-tier two-reel win and minimum-match rules
//! - Chain breaks, ways products, multiplicative wild paths
//! - Collector progression across a bonus session
//! - Event stream decodes back to the same events
//! - Configuration loading from disk
//! - Boards loaded from JSON keep wild values and shape checks

use std::io::Write;

use approx::assert_relative_eq;
use mv_stage::{GameEvent, deserialize_event};
use mv_ways::{Board, GameConfig, GameMode, PayTable, SpinEngine, Symbol, WaysEvaluator};

const BET: f64 = 1.0;

fn board(reels: &[&str]) -> Board {
    Board::parse(reels).unwrap()
}

#[test]
fn two_top_tier_reels_pay_the_two_of_a_kind_entry() {
    let config = GameConfig::default();
    let wins = config.evaluator().evaluate(
        &board(&[
            "H1 H2 H3 H4",
            "H1 L2 L3 L4",
            "L1 L6 L6 L6",
            "L1 L2 L3 L4",
            "L1 H2 H3 H4",
        ]),
        BET,
    );

    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0].symbol, Symbol::H1);
    assert_eq!(wins[0].match_length, 2);
    assert_eq!(wins[0].ways, 1);
    assert_relative_eq!(wins[0].multiplier, 1.0);
    assert_relative_eq!(wins[0].payout, config.paytable.pay(Symbol::H1, 2).unwrap() * BET);
}

#[test]
fn non_top_tier_never_pays_two_reels() {
    let paytable = PayTable::standard().with_pays(Symbol::H2, &[(2, 5.0)]);
    let evaluator = WaysEvaluator::new(&paytable);

    let b = board(&["H2 L1", "H2 L2", "L3 L4", "L6 L1", "L2 L3"]);
    assert!(evaluator.evaluate_symbol(&b, Symbol::H2, BET).is_none());
}

#[test]
fn later_reels_do_not_rescue_a_broken_chain() {
    let config = GameConfig::default();
    let b = board(&[
        "H2 L1 L1 L1",
        "L2 L3 L3 L3",
        "H2 L4 L4 L4",
        "H2 L6 L6 L6",
        "H2 L1 L1 L1",
    ]);
    let wins = config.evaluator().evaluate(&b, BET);
    assert!(wins.iter().all(|w| w.symbol != Symbol::H2));
}

#[test]
fn ways_and_multipliers_combine_per_path() {
    let config = GameConfig::default();
    // H3 rows per reel: 2, 1, 3 -> 6 ways; the 2X on reel 2 sits on every path
    let b = board(&[
        "H3 H3 L1 L2",
        "2X L1 L2 L4",
        "H3 3X H3 L6",
        "L1 L2 L4 L6",
        "L1 L2 L4 L6",
    ]);
    let win = config.evaluator().evaluate_symbol(&b, Symbol::H3, BET).unwrap();

    assert_eq!(win.match_length, 3);
    assert_eq!(win.ways, 6);
    // paths: 2 (reel 1) × 2X × {1, 3, 1} -> 2·(2 + 6 + 2) = 20 over 6 ways
    assert_relative_eq!(win.multiplier, 20.0 / 6.0);
    assert_relative_eq!(win.payout, 0.29 * 20.0, epsilon = 1e-12);
}

#[test]
fn collector_progression_emits_each_threshold_once() {
    let config = GameConfig::default();
    let mut engine = SpinEngine::new(&config).unwrap();
    let mut book = mv_stage::EventBook::new();
    engine.start_session();

    // 0 -> 4 -> 7 -> 13 -> 15, then a spin with no collectors
    for collectors in [4usize, 3, 6, 2, 0] {
        let mut cells = vec!["L1"; 20];
        cells.iter_mut().take(collectors).for_each(|c| *c = "G");
        let reels: Vec<String> = cells.chunks(4).map(|c| c.join(" ")).collect();
        let reels: Vec<&str> = reels.iter().map(String::as_str).collect();
        engine.spin_board(board(&reels), GameMode::Free, BET, &mut book);
    }

    let fired: Vec<(u32, String)> = book
        .iter()
        .filter_map(|e| match e {
            GameEvent::SymbolTransformation(t) => Some((t.threshold, t.transformation.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        fired,
        vec![
            (4, "H4_TO_H1".to_string()),
            (7, "H3_TO_H1".to_string()),
            (13, "H2_TO_H1".to_string()),
            (15, "INFINITE_BREACH".to_string()),
        ]
    );
    assert_eq!(book.of_type("collectorCollection").count(), 4);
}

#[test]
fn upgraded_symbols_pay_as_top_tier_in_the_same_spin() {
    let config = GameConfig::default();
    let mut engine = SpinEngine::new(&config).unwrap();
    let mut book = mv_stage::EventBook::new();
    engine.start_session();

    let outcome = engine.spin_board(
        board(&["G H4 L1 L2", "G H4 L1 L2", "G H1 L4 L6", "G L6 L4 L2", "L1 L2 L4 L6"]),
        GameMode::Free,
        BET,
        &mut book,
    );

    assert_eq!(outcome.active_transformations, vec!["H4_TO_H1"]);
    assert_eq!(outcome.original_board.count(Symbol::H4), 2);
    assert_eq!(outcome.transformed_positions(), vec![(0, 1), (1, 1)]);

    let h1 = outcome.wins.iter().find(|w| w.symbol == Symbol::H1).unwrap();
    assert_eq!(h1.match_length, 3);
    assert_relative_eq!(h1.payout, 0.59);
}

#[test]
fn round_events_decode_to_the_same_events() {
    let config = GameConfig::default();
    let mut engine = SpinEngine::new(&config).unwrap().with_seed(2024);

    let mut checked = 0;
    for _ in 0..300 {
        let round = engine.play_round(BET);
        let lines = round.events.to_json_lines();
        for (line, event) in lines.lines().zip(round.events.iter()) {
            assert_eq!(&deserialize_event(line).unwrap(), event);
            checked += 1;
        }
    }
    assert!(checked >= 300);
}

#[test]
fn config_loads_from_yaml_and_json_files() {
    let config = GameConfig {
        name: "file_test".into(),
        max_freespins: 60,
        ..GameConfig::default()
    };

    let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    yaml.write_all(config.to_yaml_string().unwrap().as_bytes()).unwrap();
    assert_eq!(GameConfig::load(yaml.path()).unwrap(), config);

    let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    json.write_all(serde_json::to_string(&config).unwrap().as_bytes()).unwrap();
    assert_eq!(GameConfig::load(json.path()).unwrap(), config);

    assert!(GameConfig::load("/nonexistent/meta_vault.yaml").is_err());
}

#[test]
fn loaded_wild_without_multiplier_field_keeps_its_value() {
    let config = GameConfig::default();
    let b: Board = serde_json::from_str(
        r#"{"reels":[
            [{"symbol":"3X"},{"symbol":"L1"}],
            [{"symbol":"H1"},{"symbol":"L2"}],
            [{"symbol":"H1"},{"symbol":"L3"}]
        ]}"#,
    )
    .unwrap();

    let win = config.evaluator().evaluate_symbol(&b, Symbol::H1, BET).unwrap();
    assert_eq!(win.match_length, 3);
    assert_eq!(win.ways, 1);
    assert_relative_eq!(win.multiplier, 3.0);
    assert_relative_eq!(win.payout, config.paytable.pay(Symbol::H1, 3).unwrap() * 3.0 * BET);
}

#[test]
fn loaded_ragged_board_is_rejected() {
    let ragged = r#"{"reels":[[{"symbol":"H1"},{"symbol":"H2"}],[{"symbol":"H1"}],[{"symbol":"H1"},{"symbol":"L1"}]]}"#;
    assert!(serde_json::from_str::<Board>(ragged).is_err());
}
