use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use lottery_wheel::config::{PotentialStrategy, WheelConfig};
use lottery_wheel::progress::ConsoleProgress;
use lottery_wheel::utilities::{verify_wheel, write_wheel_file};
use lottery_wheel::wheel_search::snapshot::BestWheelSnapshot;
use lottery_wheel::wheel_search::WheelSearch;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StrategyArg {
    /// depth-first charging over the ticket/match graph
    Incremental,
    /// rescan every pair of tickets after each selection (small ranges only)
    Pairwise,
}

impl From<StrategyArg> for PotentialStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Incremental => PotentialStrategy::Incremental,
            StrategyArg::Pairwise => PotentialStrategy::Pairwise,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "wheelgen",
    about = "greedily builds a small set of tickets guaranteeing a partial match with any draw"
)]
struct Cli {
    /// numbers are drawn from 1..=range
    range: usize,
    /// numbers per ticket
    ticket_size: usize,
    /// numbers a wheel ticket must share with any drawn ticket
    match_size: usize,
    /// independent greedy trials, the smallest wheel wins
    #[arg(short, long, default_value = "1")]
    trials: usize,
    /// never select tickets that share a match with each other
    #[arg(long)]
    no_overlap: bool,
    #[arg(long, value_enum, default_value = "incremental")]
    strategy: StrategyArg,
    /// seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// worker threads running trials
    #[arg(long, default_value = "1")]
    threads: usize,
    /// write the wheel here, one ticket per line
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// best wheel snapshot to resume from and update
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let start_time = SystemTime::now();

    let config = WheelConfig {
        range: cli.range,
        ticket_size: cli.ticket_size,
        match_size: cli.match_size,
        trial_count: cli.trials,
        allow_overlap: !cli.no_overlap,
        strategy: cli.strategy.into(),
        seed: cli.seed,
    };

    let mut snapshot = match &cli.snapshot {
        Some(path) if path.exists() => match BestWheelSnapshot::read_from_file(path) {
            Ok(snapshot) if snapshot.is_compatible_with(&config) => {
                println!(
                    "resuming from snapshot {} ({} trials run, best wheel {})",
                    path.display(),
                    snapshot.trials_run(),
                    match snapshot.best_size() {
                        Some(size) => format!("of {} tickets", size),
                        None => "not found yet".to_string(),
                    }
                );
                Some(snapshot)
            }
            Ok(_) => {
                eprintln!(
                    "snapshot {} was taken for a different range, ticket size, match size or overlap setting",
                    path.display()
                );
                process::exit(1);
            }
            Err(msg) => {
                eprintln!("{}", msg);
                process::exit(1);
            }
        },
        Some(_) => Some(BestWheelSnapshot::new(config.clone(), start_time)),
        None => None,
    };
    let best_known_size = snapshot.as_ref().and_then(|snapshot| snapshot.best_size());

    let search = match WheelSearch::new(config.clone()) {
        Ok(search) => search,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            process::exit(1);
        }
    };

    // finish the running trial(s) on ctrl-c and keep the best wheel so far
    let terminator = Arc::new(AtomicBool::new(false));
    let handler_terminator = Arc::clone(&terminator);
    ctrlc::set_handler(move || {
        println!("received termination signal, stopping after the running trials");
        handler_terminator.store(true, Ordering::SeqCst);
    })
    .expect("could not set termination signal handler");
    let search = search
        .with_best_known_size(best_known_size)
        .with_terminator(terminator);

    println!(
        "searching for a {}/{}/{} wheel over {} tickets with {} trials",
        config.range,
        config.ticket_size,
        config.match_size,
        config.ticket_count(),
        config.trial_count
    );

    let mut progress = ConsoleProgress::new(start_time);
    let search_result = if cli.threads > 1 {
        search.run_parallel(cli.threads, &mut progress)
    } else {
        search.run(&mut progress)
    };
    let result = match search_result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let tickets = match (&result.best, &mut snapshot) {
        (Some(wheel), snapshot) => {
            if let Some(snapshot) = snapshot {
                snapshot.update_with_result(&result);
            }
            wheel.tickets().to_vec()
        }
        // every trial was abandoned: the snapshot still holds the best wheel
        (None, Some(snapshot)) if snapshot.best_size().is_some() => {
            snapshot.update_with_result(&result);
            match snapshot.resolve() {
                Ok(tickets) => tickets,
                Err(msg) => {
                    eprintln!("{}", msg);
                    process::exit(1);
                }
            }
        }
        (None, _) => {
            println!("no wheel found after {} trials", result.trials_run);
            process::exit(1);
        }
    };

    if let Err(uncovered) = verify_wheel(&config, &tickets) {
        panic!("generated wheel misses ticket {}", uncovered);
    }

    println!("wheel of {} tickets:", tickets.len());
    for ticket in tickets.iter() {
        println!("{}", ticket);
    }

    if let Some(path) = &cli.output {
        match write_wheel_file(path, &tickets) {
            Ok(_) => println!("wrote wheel to {}", path.display()),
            Err(msg) => eprintln!("{}", msg),
        }
    }

    if let (Some(path), Some(snapshot)) = (&cli.snapshot, &snapshot) {
        match snapshot.write_to_file(path) {
            Ok(_) => println!("updated snapshot {}", path.display()),
            Err(msg) => eprintln!("{}", msg),
        }
    }
}
