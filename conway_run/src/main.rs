//! conway-run: advance a random grid for a fixed number of generations and
//! report how long each update strategy took.

use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::info;

use conway::config::{DEFAULT_HEIGHT, DEFAULT_SEED_PROBABILITY, DEFAULT_WIDTH};
use conway::{Life, LifeConfig, Snapshot, Strategy};

#[derive(Parser)]
#[command(name = "conway-run", about = "Run Conway's Game of Life headless and time it")]
struct Args {
    /// Grid width, border included
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Grid height, border included
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Chance each interior cell starts alive
    #[arg(short = 'p', long, default_value_t = DEFAULT_SEED_PROBABILITY)]
    probability: f64,

    /// RNG seed (random when omitted)
    #[arg(short = 's', long)]
    seed: Option<u64>,

    /// Generations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    generations: usize,

    /// Update strategy: sequential, per-cell, worker-pool[:N] or all
    #[arg(long, default_value = "worker-pool", value_parser = parse_mode)]
    strategy: Mode,

    /// Worker pool size (overrides a size given with --strategy)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Work queue capacity (default: one generation's columns)
    #[arg(long)]
    work_queue: Option<usize>,

    /// Results queue capacity (default: one generation's columns)
    #[arg(long)]
    results_queue: Option<usize>,

    /// Runtime worker threads (default: available parallelism)
    #[arg(long)]
    threads: Option<usize>,

    /// Suppress all logging
    #[arg(long)]
    log_disable: bool,
}

#[derive(Clone, Debug)]
enum Mode {
    Single(Strategy),
    All,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    if s.eq_ignore_ascii_case("all") {
        return Ok(Mode::All);
    }
    s.parse::<Strategy>().map(Mode::Single).map_err(|_| {
        format!(
            "Unknown strategy '{}'. Options: {}, all",
            s,
            Strategy::NAMES.join(", ")
        )
    })
}

/// The seed every strategy in a run shares; drawn from the thread RNG when
/// `--seed` is omitted.
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random::<u64>)
}

/// Logging to stderr, `RUST_LOG` aware, defaulting to INFO.
fn init_logging(disable: bool) {
    use tracing_subscriber::EnvFilter;

    if disable {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_disable);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let with_workers = |strategy: Strategy| match (strategy, args.workers) {
        (Strategy::WorkerPool(_), Some(workers)) => Strategy::WorkerPool(workers),
        _ => strategy,
    };
    let strategies: Vec<Strategy> = match args.strategy {
        Mode::Single(strategy) => vec![with_workers(strategy)],
        Mode::All => [Strategy::Sequential, Strategy::ParallelPerCell, Strategy::default()]
            .into_iter()
            .map(with_workers)
            .collect(),
    };

    // Every strategy starts from the same grid so the results can be compared
    let seed = resolve_seed(args.seed);
    info!(seed, "seeding grid");

    let mut finals: Vec<(Strategy, Snapshot)> = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let mut config = LifeConfig::new(args.width, args.height)
            .with_seed_probability(args.probability)
            .with_seed(seed)
            .with_strategy(strategy);
        config.work_queue_capacity = args.work_queue;
        config.results_queue_capacity = args.results_queue;
        config.runtime_threads = args.threads;

        let mut life = Life::initialize(config)?;
        let start = Instant::now();
        for _ in 0..args.generations {
            life.step()?;
        }
        let elapsed = start.elapsed();

        let snapshot = life.snapshot();
        info!(
            %strategy,
            generations = args.generations,
            population = snapshot.population(),
            ms = elapsed.as_secs_f64() * 1000.0,
            "run complete"
        );
        println!("{:<16} Finished: {:?}", strategy.to_string(), elapsed);
        finals.push((strategy, snapshot));
    }

    if let Some(((first, expected), rest)) = finals.split_first() {
        for (strategy, snapshot) in rest {
            if snapshot != expected {
                return Err(format!(
                    "{} and {} disagree after {} generations",
                    first, strategy, args.generations
                )
                .into());
            }
        }
        if !rest.is_empty() {
            println!("All strategies agree ({} alive)", expected.population());
        }
    }

    Ok(())
}
