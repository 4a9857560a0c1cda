//! CLI argument parsing

use clap::Parser;
use lpcboot_core::ManualActions;

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "GPIO backend to use [available: {}]",
        lpcboot_backend::backend_names_short()
    )
}

const ABOUT: &str = "Control the reset and bootstrap lines of an LPC210x board";

const LONG_ABOUT: &str = "Control the reset and bootstrap lines of an LPC210x board.

RESET defaults to header pin 16 and BOOTSTRAP to header pin 18. Both lines \
are active low: activating one drives it to low voltage, deactivating it \
drives it to high voltage.

Both lines are claimed and deactivated before any flag is applied. Flags are \
then applied in a fixed order (-r, -R, -b, -B), so a deactivate flag wins \
over the matching activate flag. Without -q the lines stay claimed at their \
last levels when the tool exits.";

#[derive(Parser)]
#[command(name = "lpc-gpio")]
#[command(author, version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Activate (set low) the reset pin
    #[arg(short = 'r', long)]
    pub reset_activate: bool,

    /// Deactivate (set high) the reset pin
    #[arg(short = 'R', long)]
    pub reset_deactivate: bool,

    /// Activate (set low) the bootstrap pin
    #[arg(short = 'b', long)]
    pub bootstrap_activate: bool,

    /// Deactivate (set high) the bootstrap pin
    #[arg(short = 'B', long)]
    pub bootstrap_deactivate: bool,

    /// Release the GPIO lines when done
    #[arg(short = 'q', long)]
    pub cleanup: bool,

    /// GPIO backend, e.g. linux_gpio:gpiochip=0,numbering=board
    #[arg(
        short,
        long,
        env = lpcboot_backend::GPIO_ENV,
        default_value = lpcboot_backend::DEFAULT_BACKEND,
        help = backend_help(),
        long_help = lpcboot_backend::backend_help()
    )]
    pub gpio: String,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Line operations selected by the flags
    pub fn actions(&self) -> ManualActions {
        ManualActions {
            reset_activate: self.reset_activate,
            reset_deactivate: self.reset_deactivate,
            bootstrap_activate: self.bootstrap_activate,
            bootstrap_deactivate: self.bootstrap_deactivate,
            cleanup: self.cleanup,
        }
    }
}
