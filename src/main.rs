//! lpc-gpio - manual control of the LPC210x reset and bootstrap lines
//!
//! Claims both lines (driving them inactive), applies the requested
//! activate/deactivate flags in a fixed order and optionally releases the
//! lines again. See `lpc-program` for the automated flashing sequence.

mod cli;

use clap::Parser;
use cli::Cli;
use lpcboot_backend::open_backend;
use std::process::ExitCode;

/// Logger whose default filter follows `-v`; RUST_LOG still wins when set
fn log_builder(verbose: u8) -> env_logger::Builder {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    log_builder(cli.verbose).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let backend = open_backend(&cli.gpio)?;
    lpcboot_core::run_manual(backend.gpio, &backend.pins, &cli.actions())?;
    Ok(())
}
