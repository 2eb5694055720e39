//! Meta Vault simulation CLI
//!
//! Usage:
//!   mv-sim run --spins 1000000 --seed 7      - RTP run with summary
//!   mv-sim run --json --payout-log out.csv   - JSON report plus payout log
//!   mv-sim defaults                          - Print the default game config
//!   mv-sim replay --seed 7 --rounds 3        - Print round events as JSON lines

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mv_sim::{SimConfig, Simulator};
use mv_stage::serialize_event;
use mv_ways::{GameConfig, SpinEngine};

#[derive(Parser)]
#[command(name = "mv-sim", about = "Meta Vault math simulator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Monte-Carlo RTP simulation
    Run {
        /// Rounds to play
        #[arg(short, long, default_value_t = 100_000)]
        spins: u64,
        /// Stake per round
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Random seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Worker threads (0 = one per CPU)
        #[arg(short, long, default_value_t = 0)]
        workers: usize,
        /// Rounds per batch
        #[arg(long, default_value_t = 10_000)]
        batch_size: u64,
        /// Game configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the per-round payout log to this file
        #[arg(long)]
        payout_log: Option<PathBuf>,
        /// Stop after this many seconds and report what finished
        #[arg(long)]
        max_seconds: Option<u64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in game configuration as YAML
    Defaults,
    /// Play rounds and print every event as a JSON line
    Replay {
        /// Random seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Rounds to play
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,
        /// Stake per round
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Only print events of this type (e.g. symbolTransformation)
        #[arg(short = 't', long = "type")]
        event_type: Option<String>,
        /// Game configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            spins,
            bet,
            seed,
            workers,
            batch_size,
            config,
            payout_log,
            max_seconds,
            json,
        } => {
            let mut sim_config = SimConfig::default()
                .with_spins(spins)
                .with_bet(bet)
                .with_workers(workers)
                .with_batch_size(batch_size)
                .with_payout_log(payout_log.is_some());
            if let Some(seed) = seed {
                sim_config = sim_config.with_seed(seed);
            }
            run(load_game(config)?, sim_config, payout_log, max_seconds, json)
        }
        Commands::Defaults => {
            print!("{}", GameConfig::default().to_yaml_string()?);
            Ok(())
        }
        Commands::Replay {
            seed,
            rounds,
            bet,
            event_type,
            config,
        } => replay(load_game(config)?, seed, rounds, bet, event_type.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_game(path: Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(&path).with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn run(
    game: GameConfig,
    config: SimConfig,
    payout_log: Option<PathBuf>,
    max_seconds: Option<u64>,
    json: bool,
) -> Result<()> {
    let sim = Simulator::new(&game, config).context("Invalid simulation setup")?;
    let done = AtomicBool::new(false);

    let report = thread::scope(|scope| {
        if let Some(limit) = max_seconds {
            let cancel = sim.cancel_handle();
            let done = &done;
            scope.spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(limit);
                while !done.load(Ordering::Relaxed) {
                    if Instant::now() >= deadline {
                        log::warn!("Time limit of {}s reached, stopping", limit);
                        cancel.cancel();
                        break;
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            });
        }

        let report = sim.run_configured();
        done.store(true, Ordering::Relaxed);
        report
    })?;

    if json {
        println!("{}", report.to_json_pretty()?);
    } else {
        println!("{}", report.summary());
        for bucket in &report.histogram {
            println!("  {:>12}x  {:>10}  {:>7.3}%", bucket.label, bucket.count, bucket.share * 100.0);
        }
    }

    if let Some(path) = payout_log {
        report
            .write_payout_log(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

fn replay(game: GameConfig, seed: u64, rounds: u32, bet: f64, event_type: Option<&str>) -> Result<()> {
    if !bet.is_finite() || bet <= 0.0 {
        bail!("bet must be positive, got {}", bet);
    }

    let mut engine = SpinEngine::new(&game)?.with_seed(seed);
    for _ in 0..rounds {
        let round = engine.play_round(bet);
        for event in round.events.iter() {
            if event_type.is_none_or(|t| t == event.type_name()) {
                println!("{}", serialize_event(event));
            }
        }
    }
    Ok(())
}
