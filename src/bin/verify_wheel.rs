use clap::Parser;
use std::path::PathBuf;
use std::process;

use lottery_wheel::config::WheelConfig;
use lottery_wheel::utilities::{read_wheel_file, verify_wheel};

#[derive(Parser)]
#[command(
    name = "verify_wheel",
    about = "checks that a wheel file covers every ticket of a configuration"
)]
struct Cli {
    range: usize,
    ticket_size: usize,
    match_size: usize,
    /// one ticket per line, e.g. 3;7;12
    wheel_file: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = WheelConfig::new(cli.range, cli.ticket_size, cli.match_size);
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {}", e);
        process::exit(1);
    }

    let wheel = match read_wheel_file(&cli.wheel_file) {
        Ok(wheel) => wheel,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    };
    println!(
        "read {} tickets from {}",
        wheel.len(),
        cli.wheel_file.display()
    );

    for ticket in wheel.iter() {
        let out_of_range = ticket.numbers().into_iter().any(|n| n as usize > config.range);
        if ticket.len() != config.ticket_size || out_of_range {
            eprintln!(
                "ticket {} is not a {} number ticket over 1..={}",
                ticket, config.ticket_size, config.range
            );
            process::exit(1);
        }
    }

    match verify_wheel(&config, &wheel) {
        Ok(()) => println!(
            "every one of the {} tickets shares at least {} numbers with the wheel",
            config.ticket_count(),
            config.match_size
        ),
        Err(uncovered) => {
            println!("ticket {} is not covered by the wheel", uncovered);
            process::exit(1);
        }
    }
}
