//! lpc-program - flash an LPC210x through its serial bootloader
//!
//! Usage: lpc-program [flasher-arguments...]
//!
//! Puts the target into ISP mode, runs the flasher (`lpc21isp` by default)
//! with every argument given to this program, then resets the target into
//! the new firmware. This program takes no options of its own so that
//! arguments reach the flasher exactly as typed.
//!
//! Configuration comes from the environment:
//!
//! - `LPCBOOT_GPIO` - backend string (default `linux_gpio`)
//! - `LPCBOOT_SEQUENCE` - `settle_ms=N,flasher=NAME,terminal=NAME,exit=flasher|legacy`
//! - `RUST_LOG` - log filter (default `info`)

use lpcboot_backend::{backend_from_env, open_backend};
use lpcboot_core::{ProgramSequence, SequenceConfig, StdDelay, SystemRunner};
use std::ffi::OsString;
use std::process::ExitCode;

/// Environment variable holding the sequence options
const SEQUENCE_ENV: &str = "LPCBOOT_SEQUENCE";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = flasher_args(std::env::args_os());

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Everything after the program name, untouched
fn flasher_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter().skip(1).collect()
}

fn sequence_config() -> Result<SequenceConfig, Box<dyn std::error::Error>> {
    match std::env::var(SEQUENCE_ENV) {
        Ok(options) => Ok(SequenceConfig::parse(&options)?),
        Err(std::env::VarError::NotPresent) => Ok(SequenceConfig::default()),
        Err(e) => Err(format!("{}: {}", SEQUENCE_ENV, e).into()),
    }
}

fn run(args: &[OsString]) -> Result<u8, Box<dyn std::error::Error>> {
    let config = sequence_config()?;
    let backend = open_backend(&backend_from_env())?;

    let mut sequence = ProgramSequence::new(&config, StdDelay, SystemRunner);
    let outcome = sequence.run(backend.gpio, &backend.pins, args)?;

    Ok(outcome.exit_code(config.exit_policy))
}
